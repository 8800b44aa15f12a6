//! HTTP counting service — lab counter protocol compatible.
//!
//! Answers `GET /get_counts/{student_id}/{counting_time_us}/{activity_us}`
//! with `{"counts": n}`, drawing `n` from a [`SimulatedRadiationCounter`].
//! Any [`radcount_core::RadiationCounter`] can be pointed at it instead of
//! the public lab service, e.g. for offline classes or tests.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::Serialize;

use radcount_core::{
    CountsResponse, LAB_SOURCE_SENTINEL, MAX_CALIBRATION_SOURCE_ACTIVITY, MAX_COUNTING_TIME,
    RadioactiveSource, SimulatedRadiationCounter, check_counting_time,
};

/// Detector model served to every client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    pub efficiency: f64,
    /// Background rate in Hz.
    pub background: f64,
    /// Activity of the built-in lab source in Bq. Clamped like any other
    /// source to the calibration maximum.
    pub lab_source_activity: f64,
    /// Hold each response for the requested counting time.
    pub realtime: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            efficiency: 1.0,
            background: 0.0,
            lab_source_activity: 20.0,
            realtime: false,
        }
    }
}

/// Shared server state.
struct AppState {
    config: ServerConfig,
    detector: SimulatedRadiationCounter,
    lab_source: RadioactiveSource,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            success: false,
            error: message.into(),
        }),
    )
}

async fn handle_get_counts(
    State(state): State<Arc<AppState>>,
    Path((student_id, counting_time_us, activity_us)): Path<(u64, i64, i64)>,
) -> Result<Json<CountsResponse>, ApiError> {
    let counting_time = counting_time_us as f64 / 1e6;
    check_counting_time(counting_time).map_err(|e| bad_request(e.to_string()))?;

    let source = match activity_us {
        LAB_SOURCE_SENTINEL => Some(state.lab_source),
        0 => None,
        a if a > 0 => Some(RadioactiveSource::new(a as f64 / 1e6)),
        a => {
            return Err(bad_request(format!(
                "activity_us must be {LAB_SOURCE_SENTINEL} (lab source), 0 (no source) or positive; got {a}"
            )));
        }
    };

    let mut detector = state.detector.clone();
    detector
        .set_counting_time(counting_time)
        .map_err(|e| bad_request(e.to_string()))?;
    if let Some(source) = source {
        detector.insert_calibration_source(source);
    }
    let counts = detector.get_data(1).first().copied().unwrap_or(0);

    if state.config.realtime {
        tokio::time::sleep(Duration::from_micros(counting_time_us as u64)).await;
    }

    log::info!(
        "student {student_id}: {counts} counts in {counting_time} s (activity_us={activity_us})"
    );
    Ok(Json(CountsResponse { counts }))
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: radcount_core::VERSION.to_string(),
    })
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "radcount counting service",
        "version": radcount_core::VERSION,
        "detector": state.config,
        "endpoints": {
            "/": "This API index",
            "/get_counts/{student_id}/{counting_time_us}/{activity_us}": {
                "method": "GET",
                "description": "Count decays for one counting window",
                "params": {
                    "student_id": "Non-negative integer, 0 for anonymous",
                    "counting_time_us": format!("Counting time in microseconds (0-{})", (MAX_COUNTING_TIME * 1e6) as i64),
                    "activity_us": format!(
                        "Calibration source activity in micro-Bq (max {}), 0 for no source, -1 for the lab source",
                        (MAX_CALIBRATION_SOURCE_ACTIVITY * 1e6) as i64
                    ),
                }
            },
            "/health": "Health check",
        },
        "examples": {
            "no_source": "/get_counts/0/10000000/0",
            "calibration_source": "/get_counts/0/10000000/5000000",
            "lab_source": "/get_counts/0/10000000/-1",
        }
    }))
}

/// Build the axum router.
pub fn build_router(config: ServerConfig) -> Router {
    let detector = SimulatedRadiationCounter::new(config.efficiency, config.background);
    let lab_source = RadioactiveSource::new(config.lab_source_activity);
    let state = Arc::new(AppState {
        config,
        detector,
        lab_source,
    });

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route(
            "/get_counts/{student_id}/{counting_time_us}/{activity_us}",
            get(handle_get_counts),
        )
        .with_state(state)
}

/// Serve on an already bound listener.
pub async fn serve(listener: tokio::net::TcpListener, config: ServerConfig) -> std::io::Result<()> {
    axum::serve(listener, build_router(config)).await
}

/// Run the HTTP counting service.
pub async fn run_server(config: ServerConfig, host: &str, port: u16) -> std::io::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("counting service listening on {}", listener.local_addr()?);
    serve(listener, config).await
}

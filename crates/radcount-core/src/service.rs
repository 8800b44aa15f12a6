//! Counting service protocol and the blocking HTTP client for it.
//!
//! The lab detector sits behind a plain HTTP endpoint:
//!
//! ```text
//! GET {base_url}/get_counts/{student_id}/{counting_time_us}/{activity_us}
//! -> {"counts": 123}
//! ```
//!
//! Times and activities travel as integer micro-units. An `activity_us` of
//! `-1` selects the lab source built into the counter (its activity is known
//! only to the service); `0` means nothing is inserted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MeasurementError;

/// Default public counting service.
pub const DEFAULT_BASE_URL: &str = "http://dklab.ipypm.ca/";

/// Extra time allowed on top of the counting window before a request
/// times out. The service holds its response for the whole window.
pub const DEFAULT_TIMEOUT_MARGIN: Duration = Duration::from_secs(15);

/// `activity_us` value meaning "the lab source is inserted".
pub const LAB_SOURCE_SENTINEL: i64 = -1;

/// Body returned by the counting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountsResponse {
    pub counts: u64,
}

/// One measurement request, already encoded in wire units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountRequest {
    pub student_id: u64,
    pub counting_time_us: i64,
    pub activity_us: i64,
}

impl CountRequest {
    /// URL path relative to the service root (no leading slash).
    pub fn path(&self) -> String {
        format!(
            "get_counts/{}/{}/{}",
            self.student_id, self.counting_time_us, self.activity_us
        )
    }

    /// Counting window this request asks for.
    pub fn counting_window(&self) -> Duration {
        Duration::from_micros(self.counting_time_us.max(0) as u64)
    }
}

/// Seconds (or Bq) to integer micro-units, rounded to nearest.
pub fn to_micros(value: f64) -> i64 {
    (value * 1e6).round() as i64
}

/// Anything that can turn a [`CountRequest`] into a number of counts.
pub trait CountingService: Send + Sync {
    /// Perform exactly one measurement attempt.
    fn get_counts(&self, request: &CountRequest) -> Result<u64, MeasurementError>;
}

/// Where the counting service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_margin: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_margin: DEFAULT_TIMEOUT_MARGIN,
        }
    }
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Full URL for a request.
    pub fn url_for(&self, request: &CountRequest) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), request.path())
    }
}

/// Blocking HTTP client for the counting service. One attempt per call;
/// each request times out after its counting window plus the configured
/// margin.
///
/// Building the client cannot fail from the caller's point of view: if
/// `reqwest` cannot set one up, every request fails with
/// [`MeasurementError::Unavailable`] instead.
#[derive(Debug, Clone)]
pub struct HttpCountingService {
    client: Result<reqwest::blocking::Client, String>,
    config: ServiceConfig,
}

impl HttpCountingService {
    pub fn new(config: ServiceConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| e.to_string());
        if let Err(e) = &client {
            log::error!("cannot build an HTTP client for {}: {e}", config.base_url);
        }
        Self { client, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

impl CountingService for HttpCountingService {
    fn get_counts(&self, request: &CountRequest) -> Result<u64, MeasurementError> {
        let client = self
            .client
            .as_ref()
            .map_err(|e| MeasurementError::unavailable(format!("no HTTP client ({e})")))?;
        let url = self.config.url_for(request);
        let timeout = request.counting_window() + self.config.timeout_margin;
        log::debug!("GET {url} (timeout {timeout:?})");

        let body: CountsResponse = client
            .get(&url)
            .timeout(timeout)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(body.counts)
    }
}

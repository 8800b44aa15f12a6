use std::time::Duration;

use radcount_core::{Measurement, RadiationCounter, RadioactiveSource, ServiceConfig, SourceSlot};

pub struct MeasureCommandConfig<'a> {
    pub student_id: u64,
    pub counting_time: f64,
    pub activity: Option<f64>,
    pub lab_source: bool,
    pub url: &'a str,
    pub timeout_margin: Duration,
    pub json: bool,
}

fn measurement_label(measurement: &Measurement) -> &'static str {
    match measurement {
        Measurement::NotStarted => "not_started",
        Measurement::Counted(_) => "counted",
        Measurement::Failed(_) => "failed",
    }
}

fn slot_label(slot: &SourceSlot) -> String {
    match slot {
        SourceSlot::Empty => "none".to_string(),
        SourceSlot::Calibration(s) => format!("calibration ({} Bq)", s.activity()),
        SourceSlot::Lab => "lab".to_string(),
    }
}

pub fn run(cfg: MeasureCommandConfig<'_>) {
    let service = ServiceConfig {
        base_url: cfg.url.to_string(),
        timeout_margin: cfg.timeout_margin,
    };
    let mut counter = RadiationCounter::with_config(cfg.student_id, service);

    if let Err(e) = counter.set_counting_time(cfg.counting_time) {
        eprintln!("Invalid counting time: {e}");
        std::process::exit(1);
    }
    if cfg.lab_source {
        counter.insert_lab_source();
    } else if let Some(activity) = cfg.activity {
        counter.insert_calibration_source(RadioactiveSource::new(activity));
    }

    let request = counter.request();
    counter.start();

    if cfg.json {
        super::print_json(&serde_json::json!({
            "student_id": counter.student_id(),
            "counting_time": counter.counting_time(),
            "source": slot_label(counter.slot()),
            "request": request.path(),
            "state": measurement_label(counter.measurement()),
            "success": counter.success(),
            "count": counter.count(),
            "error": counter.last_error().map(|e| e.to_string()),
        }));
    } else if counter.success() {
        println!(
            "{} counts in {} s (source: {})",
            counter.count(),
            counter.counting_time(),
            slot_label(counter.slot())
        );
    }

    if !counter.success() {
        if !cfg.json {
            if let Some(e) = counter.last_error() {
                eprintln!("Measurement failed: {e}");
            }
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_labels() {
        assert_eq!(slot_label(&SourceSlot::Empty), "none");
        assert_eq!(slot_label(&SourceSlot::Lab), "lab");
        assert_eq!(
            slot_label(&SourceSlot::Calibration(RadioactiveSource::new(5.0))),
            "calibration (5 Bq)"
        );
    }

    #[test]
    fn measurement_labels() {
        assert_eq!(measurement_label(&Measurement::NotStarted), "not_started");
        assert_eq!(measurement_label(&Measurement::Counted(4)), "counted");
        assert_eq!(
            measurement_label(&Measurement::Failed(
                radcount_core::MeasurementError::unavailable("offline")
            )),
            "failed"
        );
    }
}

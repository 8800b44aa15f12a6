pub mod likelihood;
pub mod measure;
pub mod server;
pub mod simulate;

use radcount_core::{RadioactiveSource, SimulatedRadiationCounter, ValidationError};

/// Detector model as given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorSettings {
    pub activity: Option<f64>,
    pub efficiency: f64,
    pub background: f64,
    pub counting_time: f64,
}

impl DetectorSettings {
    /// Build the simulated counter, rejecting out-of-range settings instead
    /// of silently keeping defaults. Activities are clamped, never rejected.
    pub fn build(&self) -> Result<SimulatedRadiationCounter, ValidationError> {
        let mut counter = SimulatedRadiationCounter::default();
        counter.set_efficiency(self.efficiency)?;
        counter.set_background(self.background)?;
        counter.set_counting_time(self.counting_time)?;
        if let Some(activity) = self.activity {
            counter.insert_calibration_source(RadioactiveSource::new(activity));
        }
        Ok(counter)
    }
}

/// Build the simulator or exit with status 1.
pub fn make_simulator(settings: &DetectorSettings) -> SimulatedRadiationCounter {
    match settings.build() {
        Ok(counter) => counter,
        Err(e) => {
            eprintln!("Invalid detector settings: {e}");
            std::process::exit(1);
        }
    }
}

/// Pretty-print a JSON value or exit with status 1.
pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("Failed to serialize output: {e}");
            std::process::exit(1);
        }
    }
}

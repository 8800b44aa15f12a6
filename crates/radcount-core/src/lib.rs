//! # radcount-core
//!
//! Models for a classroom radioactivity-counting exercise.
//!
//! A [`RadioactiveSource`] is placed in a counter, which reports the number
//! of decays seen over a counting window. Two counters share the same
//! configuration surface:
//!
//! - [`SimulatedRadiationCounter`] draws Poisson counts locally from the
//!   source activity, detector efficiency and background rate, and can
//!   evaluate the likelihood of an observed count.
//! - [`RadiationCounter`] asks the lab counting service over HTTP for a
//!   real count, with either a calibration source or the built-in lab source
//!   inserted.
//!
//! ## Quick Start
//!
//! ```
//! use radcount_core::{RadioactiveSource, SimulatedRadiationCounter};
//!
//! let mut counter = SimulatedRadiationCounter::new(0.5, 1.0);
//! counter.insert_calibration_source(RadioactiveSource::new(20.0));
//! counter.set_counting_time(10.0).unwrap();
//!
//! let runs = counter.get_data(5);
//! assert_eq!(runs.len(), 5);
//! assert!(counter.get_likelihood(110) > 0.0);
//! ```
//!
//! Nothing in this crate panics on bad input. Setters return a
//! [`ValidationError`] and keep the previous value, source activities are
//! clamped, and a failed remote measurement is recorded on the counter
//! rather than returned as an error. Diagnostics go through the `log`
//! facade.

pub mod analysis;
pub mod counter;
pub mod error;
pub mod poisson;
pub mod service;
pub mod simulated;
pub mod source;

pub use analysis::{SampleSummary, summarize};
pub use counter::{
    Insertion, MAX_COUNTING_TIME, Measurement, RadiationCounter, SourceSlot, check_counting_time,
};
pub use error::{MeasurementError, ValidationError};
pub use poisson::CountDistribution;
pub use service::{
    CountRequest, CountingService, CountsResponse, DEFAULT_BASE_URL, HttpCountingService,
    LAB_SOURCE_SENTINEL, ServiceConfig,
};
pub use simulated::{DEFAULT_COUNTING_TIME, SimulatedRadiationCounter};
pub use source::{ActivityStatus, MAX_CALIBRATION_SOURCE_ACTIVITY, RadioactiveSource};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

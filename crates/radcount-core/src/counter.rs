//! The lab radiation counter.
//!
//! Holds at most one source (a calibration source or the built-in lab
//! source) and asks a [`CountingService`] for the number of decays seen in
//! the counting window. Failures never escape [`RadiationCounter::start`];
//! they are recorded and reported through [`RadiationCounter::success`] and
//! [`RadiationCounter::count`].

use crate::error::{MeasurementError, ValidationError};
use crate::service::{
    CountRequest, CountingService, HttpCountingService, LAB_SOURCE_SENTINEL, ServiceConfig,
    to_micros,
};
use crate::simulated::DEFAULT_COUNTING_TIME;
use crate::source::RadioactiveSource;

/// Longest counting time the lab service accepts, in seconds.
pub const MAX_COUNTING_TIME: f64 = 30.0;

/// Check a counting time against the lab limits `[0, MAX_COUNTING_TIME]`.
pub fn check_counting_time(counting_time: f64) -> Result<(), ValidationError> {
    if counting_time.is_nan() {
        Err(ValidationError::NotFinite {
            field: "counting time",
        })
    } else if counting_time > MAX_COUNTING_TIME {
        Err(ValidationError::CountingTimeTooLong {
            requested: counting_time,
            max: MAX_COUNTING_TIME,
        })
    } else if counting_time < 0.0 {
        Err(ValidationError::NegativeCountingTime(counting_time))
    } else {
        Ok(())
    }
}

/// What is inside the counter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SourceSlot {
    #[default]
    Empty,
    Calibration(RadioactiveSource),
    /// The lab's own source; its activity is known only to the service.
    Lab,
}

impl SourceSlot {
    /// Encoded `activity_us` for the wire.
    pub fn activity_us(&self) -> i64 {
        match self {
            Self::Empty => 0,
            Self::Calibration(source) => to_micros(source.activity()),
            Self::Lab => LAB_SOURCE_SENTINEL,
        }
    }
}

/// Outcome of inserting a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Inserted,
    AlreadyInserted,
    Replaced,
}

/// Result of the most recent [`RadiationCounter::start`].
#[derive(Debug, Default)]
pub enum Measurement {
    #[default]
    NotStarted,
    Counted(u64),
    Failed(MeasurementError),
}

pub struct RadiationCounter {
    student_id: u64,
    counting_time: f64,
    slot: SourceSlot,
    measurement: Measurement,
    service: Box<dyn CountingService>,
}

impl std::fmt::Debug for RadiationCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadiationCounter")
            .field("student_id", &self.student_id)
            .field("counting_time", &self.counting_time)
            .field("slot", &self.slot)
            .field("measurement", &self.measurement)
            .finish_non_exhaustive()
    }
}

impl RadiationCounter {
    /// Counter talking to the public lab service. `student_id` 0 is
    /// anonymous.
    pub fn new(student_id: u64) -> Self {
        Self::with_config(student_id, ServiceConfig::default())
    }

    /// Counter talking to the service described by `config`. Never fails;
    /// a client that cannot be set up shows up as a failed measurement.
    pub fn with_config(student_id: u64, config: ServiceConfig) -> Self {
        let service = HttpCountingService::new(config);
        log::debug!("counting service at {}", service.config().base_url);
        Self::with_service(student_id, Box::new(service))
    }

    pub fn with_service(student_id: u64, service: Box<dyn CountingService>) -> Self {
        if student_id != 0 {
            log::info!(
                "lab radiation counter built for student ID {student_id}; default counting time is {DEFAULT_COUNTING_TIME} seconds"
            );
        } else {
            log::info!(
                "lab radiation counter built; default counting time is {DEFAULT_COUNTING_TIME} seconds"
            );
        }
        Self {
            student_id,
            counting_time: DEFAULT_COUNTING_TIME,
            slot: SourceSlot::Empty,
            measurement: Measurement::NotStarted,
            service,
        }
    }

    pub fn student_id(&self) -> u64 {
        self.student_id
    }

    pub fn set_counting_time(&mut self, counting_time: f64) -> Result<(), ValidationError> {
        if let Err(err) = check_counting_time(counting_time) {
            log::warn!("counting time not changed: {err}");
            return Err(err);
        }
        self.counting_time = counting_time;
        Ok(())
    }

    pub fn counting_time(&self) -> f64 {
        self.counting_time
    }

    pub fn slot(&self) -> &SourceSlot {
        &self.slot
    }

    pub fn has_lab_source(&self) -> bool {
        matches!(self.slot, SourceSlot::Lab)
    }

    pub fn calibration_source(&self) -> Option<&RadioactiveSource> {
        match &self.slot {
            SourceSlot::Calibration(source) => Some(source),
            _ => None,
        }
    }

    pub fn insert_lab_source(&mut self) -> Insertion {
        let outcome = match self.slot {
            SourceSlot::Lab => {
                log::info!("the lab source is already in the counter");
                Insertion::AlreadyInserted
            }
            SourceSlot::Calibration(_) => {
                log::info!("the calibration source has been removed from the counter");
                log::info!("the lab source has been inserted into the counter");
                Insertion::Inserted
            }
            SourceSlot::Empty => {
                log::info!("the lab source has been inserted into the counter");
                Insertion::Inserted
            }
        };
        self.slot = SourceSlot::Lab;
        outcome
    }

    pub fn insert_calibration_source(&mut self, source: RadioactiveSource) -> Insertion {
        let outcome = match self.slot {
            SourceSlot::Calibration(current) if current == source => {
                log::info!("the calibration source is already in the counter");
                Insertion::AlreadyInserted
            }
            SourceSlot::Calibration(_) => {
                log::info!("the calibration source in the counter has been replaced by the new source");
                Insertion::Replaced
            }
            SourceSlot::Lab => {
                log::info!("the lab source has been removed from the counter");
                log::info!("the calibration source has been inserted into the counter");
                Insertion::Inserted
            }
            SourceSlot::Empty => {
                log::info!("the calibration source has been inserted into the counter");
                Insertion::Inserted
            }
        };
        self.slot = SourceSlot::Calibration(source);
        outcome
    }

    pub fn remove_source(&mut self) {
        self.slot = SourceSlot::Empty;
    }

    /// Wire request for the current configuration.
    pub fn request(&self) -> CountRequest {
        CountRequest {
            student_id: self.student_id,
            counting_time_us: to_micros(self.counting_time),
            activity_us: self.slot.activity_us(),
        }
    }

    /// Run one measurement. Blocks for the counting window.
    ///
    /// Returns the count on success. On failure the error is logged and
    /// kept in [`last_error`](Self::last_error).
    pub fn start(&mut self) -> Option<u64> {
        log::info!(
            "measurement has begun; please wait {} seconds",
            self.counting_time
        );
        let request = self.request();
        match self.service.get_counts(&request) {
            Ok(counts) => {
                log::info!(
                    "number of counts observed in {} seconds was {counts}",
                    self.counting_time
                );
                self.measurement = Measurement::Counted(counts);
                Some(counts)
            }
            Err(err) => {
                log::error!("{err}");
                self.measurement = Measurement::Failed(err);
                None
            }
        }
    }

    pub fn measurement(&self) -> &Measurement {
        &self.measurement
    }

    /// Last observed count, or -1 if there is no valid measurement.
    pub fn count(&self) -> i64 {
        match self.measurement {
            Measurement::Counted(n) => i64::try_from(n).unwrap_or(i64::MAX),
            _ => -1,
        }
    }

    /// Whether the last measurement succeeded.
    pub fn success(&self) -> bool {
        matches!(self.measurement, Measurement::Counted(_))
    }

    pub fn last_error(&self) -> Option<&MeasurementError> {
        match &self.measurement {
            Measurement::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every request and answers from a script.
    #[derive(Clone, Default)]
    struct StubService {
        requests: Arc<Mutex<Vec<CountRequest>>>,
        reply: Option<u64>,
    }

    impl StubService {
        fn answering(counts: u64) -> Self {
            Self {
                reply: Some(counts),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self::default()
        }

        fn requests(&self) -> Vec<CountRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl CountingService for StubService {
        fn get_counts(&self, request: &CountRequest) -> Result<u64, MeasurementError> {
            self.requests.lock().unwrap().push(*request);
            self.reply
                .ok_or_else(|| MeasurementError::unavailable("stub detector offline"))
        }
    }

    fn counter_with(stub: &StubService) -> RadiationCounter {
        RadiationCounter::with_service(0, Box::new(stub.clone()))
    }

    #[test]
    fn defaults() {
        let c = counter_with(&StubService::failing());
        assert_eq!(c.student_id(), 0);
        assert_eq!(c.counting_time(), 10.0);
        assert_eq!(c.slot(), &SourceSlot::Empty);
        assert_eq!(c.count(), -1);
        assert!(!c.success());
        assert!(c.last_error().is_none());
        assert!(matches!(c.measurement(), Measurement::NotStarted));
    }

    #[test]
    fn counting_time_limits() {
        let mut c = counter_with(&StubService::failing());
        assert!(matches!(
            c.set_counting_time(31.0),
            Err(ValidationError::CountingTimeTooLong { .. })
        ));
        assert_eq!(c.counting_time(), 10.0);
        assert_eq!(
            c.set_counting_time(-1.0),
            Err(ValidationError::NegativeCountingTime(-1.0))
        );
        assert_eq!(c.counting_time(), 10.0);
        assert!(c.set_counting_time(f64::NAN).is_err());
        assert_eq!(c.counting_time(), 10.0);

        for t in [0.0, 30.0, 15.0] {
            assert!(c.set_counting_time(t).is_ok());
            assert_eq!(c.counting_time(), t);
        }
    }

    #[test]
    fn lab_source_transitions() {
        let mut c = counter_with(&StubService::failing());
        assert_eq!(c.insert_lab_source(), Insertion::Inserted);
        assert!(c.has_lab_source());
        assert_eq!(c.insert_lab_source(), Insertion::AlreadyInserted);
        assert!(c.has_lab_source());

        assert_eq!(
            c.insert_calibration_source(RadioactiveSource::new(5.0)),
            Insertion::Inserted
        );
        assert!(!c.has_lab_source());
        assert_eq!(c.calibration_source().map(|s| s.activity()), Some(5.0));

        assert_eq!(c.insert_lab_source(), Insertion::Inserted);
        assert!(c.has_lab_source());
        assert!(c.calibration_source().is_none());
    }

    #[test]
    fn calibration_source_transitions() {
        let mut c = counter_with(&StubService::failing());
        let a = RadioactiveSource::new(5.0);
        assert_eq!(c.insert_calibration_source(a), Insertion::Inserted);
        assert_eq!(c.insert_calibration_source(a), Insertion::AlreadyInserted);
        assert_eq!(c.slot(), &SourceSlot::Calibration(a));

        let b = RadioactiveSource::new(6.0);
        assert_eq!(c.insert_calibration_source(b), Insertion::Replaced);
        assert_eq!(c.slot(), &SourceSlot::Calibration(b));
    }

    #[test]
    fn remove_clears_everything() {
        let mut c = counter_with(&StubService::failing());
        c.insert_lab_source();
        c.remove_source();
        assert_eq!(c.slot(), &SourceSlot::Empty);
        c.insert_calibration_source(RadioactiveSource::new(1.0));
        c.remove_source();
        assert_eq!(c.slot(), &SourceSlot::Empty);
        c.remove_source();
        assert_eq!(c.slot(), &SourceSlot::Empty);
    }

    #[test]
    fn never_both_sources_after_any_sequence() {
        let mut c = counter_with(&StubService::failing());
        // Deterministic pseudo-random walk over the four operations.
        let mut state: u32 = 0x2545_F491;
        for _ in 0..500 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            match state % 4 {
                0 => {
                    c.insert_lab_source();
                    assert!(c.has_lab_source() && c.calibration_source().is_none());
                }
                1 => {
                    c.insert_calibration_source(RadioactiveSource::new((state % 40) as f64));
                    assert!(!c.has_lab_source() && c.calibration_source().is_some());
                }
                2 => {
                    c.remove_source();
                    assert!(!c.has_lab_source() && c.calibration_source().is_none());
                }
                _ => {
                    let _ = c.set_counting_time((state % 40) as f64);
                }
            }
        }
    }

    #[test]
    fn start_encodes_no_source() {
        let stub = StubService::answering(17);
        let mut c = RadiationCounter::with_service(12, Box::new(stub.clone()));
        assert_eq!(c.start(), Some(17));
        assert!(c.success());
        assert_eq!(c.count(), 17);
        assert_eq!(
            stub.requests(),
            vec![CountRequest {
                student_id: 12,
                counting_time_us: 10_000_000,
                activity_us: 0,
            }]
        );
    }

    #[test]
    fn start_encodes_calibration_and_lab() {
        let stub = StubService::answering(3);
        let mut c = counter_with(&stub);
        c.set_counting_time(2.5).unwrap();
        c.insert_calibration_source(RadioactiveSource::new(12.3456789));
        c.start();
        c.insert_lab_source();
        c.start();

        let reqs = stub.requests();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].counting_time_us, 2_500_000);
        assert_eq!(reqs[0].activity_us, 12_345_679);
        assert_eq!(reqs[1].activity_us, LAB_SOURCE_SENTINEL);
        assert_eq!(reqs[1].path(), "get_counts/0/2500000/-1");
    }

    #[test]
    fn failed_start_degrades() {
        let stub = StubService::failing();
        let mut c = counter_with(&stub);
        assert_eq!(c.start(), None);
        assert!(!c.success());
        assert_eq!(c.count(), -1);
        assert!(c.last_error().is_some());
        assert!(matches!(
            c.measurement(),
            Measurement::Failed(MeasurementError::Unavailable(_))
        ));
        // Single attempt per call.
        assert_eq!(stub.requests().len(), 1);
    }

    #[test]
    fn failure_after_success_resets_count() {
        let ok = StubService::answering(9);
        let mut c = counter_with(&ok);
        c.start();
        assert_eq!(c.count(), 9);
        assert!(matches!(c.measurement(), Measurement::Counted(9)));

        c.service = Box::new(StubService::failing());
        c.start();
        assert_eq!(c.count(), -1);
        assert!(!c.success());
    }

    #[test]
    fn construction_never_fails() {
        let mut c = RadiationCounter::with_config(5, ServiceConfig::new("not a url"));
        assert_eq!(c.student_id(), 5);
        assert!(matches!(c.measurement(), Measurement::NotStarted));
        // The bad URL only surfaces once a measurement is attempted.
        assert_eq!(c.start(), None);
        assert!(matches!(c.measurement(), Measurement::Failed(_)));
        assert_eq!(c.count(), -1);
    }
}

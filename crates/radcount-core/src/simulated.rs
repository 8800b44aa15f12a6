//! Simulated radiation counter.
//!
//! Counts are Poisson with mean
//! `activity * counting_time * efficiency + background * counting_time`.
//! Nothing is stored between queries: every call samples (or evaluates)
//! the distribution implied by the current configuration.

use rand::Rng;

use crate::error::ValidationError;
use crate::poisson::CountDistribution;
use crate::source::RadioactiveSource;

/// Counting time a freshly built counter uses, in seconds.
pub const DEFAULT_COUNTING_TIME: f64 = 10.0;

/// A detector model with configurable efficiency and background rate.
#[derive(Debug, Clone)]
pub struct SimulatedRadiationCounter {
    counting_time: f64,
    source: Option<RadioactiveSource>,
    efficiency: f64,
    background: f64,
}

impl Default for SimulatedRadiationCounter {
    fn default() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl SimulatedRadiationCounter {
    /// Build a counter. Invalid `efficiency` or `background` values are
    /// rejected with a warning and the defaults (1.0 and 0 Hz) are kept.
    pub fn new(efficiency: f64, background: f64) -> Self {
        let mut counter = Self {
            counting_time: DEFAULT_COUNTING_TIME,
            source: None,
            efficiency: 1.0,
            background: 0.0,
        };
        let _ = counter.set_efficiency(efficiency);
        let _ = counter.set_background(background);
        log::info!(
            "simulated detector built: counting time = {} s, efficiency = {}, background rate = {} Hz",
            counter.counting_time,
            counter.efficiency,
            counter.background
        );
        counter
    }

    pub fn set_counting_time(&mut self, counting_time: f64) -> Result<(), ValidationError> {
        if !counting_time.is_finite() {
            let err = ValidationError::NotFinite {
                field: "counting time",
            };
            log::warn!("{err}; counting time is not changed");
            return Err(err);
        }
        if counting_time < 0.0 {
            let err = ValidationError::NegativeCountingTime(counting_time);
            log::warn!("{err}; counting time is not changed");
            return Err(err);
        }
        self.counting_time = counting_time;
        Ok(())
    }

    /// Counting time in seconds.
    pub fn counting_time(&self) -> f64 {
        self.counting_time
    }

    /// Put a source in front of the detector, replacing any previous one.
    pub fn insert_calibration_source(&mut self, source: RadioactiveSource) {
        self.source = Some(source);
    }

    pub fn source(&self) -> Option<&RadioactiveSource> {
        self.source.as_ref()
    }

    pub fn set_efficiency(&mut self, efficiency: f64) -> Result<(), ValidationError> {
        if (0.0..=1.0).contains(&efficiency) {
            self.efficiency = efficiency;
            Ok(())
        } else {
            let err = ValidationError::EfficiencyOutOfRange(efficiency);
            log::warn!("{err}; efficiency is not changed");
            Err(err)
        }
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    pub fn set_background(&mut self, background: f64) -> Result<(), ValidationError> {
        let err = if !background.is_finite() {
            ValidationError::NotFinite {
                field: "background rate",
            }
        } else if background < 0.0 {
            ValidationError::NegativeBackground(background)
        } else {
            self.background = background;
            return Ok(());
        };
        log::warn!("{err}; background rate is not changed");
        Err(err)
    }

    /// Background rate in Hz.
    pub fn background(&self) -> f64 {
        self.background
    }

    /// Mean number of counts in one counting window.
    pub fn expected_counts(&self) -> f64 {
        let activity = self.source.map_or(0.0, |s| s.activity());
        activity * self.counting_time * self.efficiency + self.background * self.counting_time
    }

    /// The distribution `get_data` samples from.
    pub fn distribution(&self) -> CountDistribution {
        CountDistribution::new(self.expected_counts())
    }

    /// `reps` independent counting runs, using the thread-local RNG.
    pub fn get_data(&self, reps: usize) -> Vec<u64> {
        self.get_data_with_rng(reps, &mut rand::rng())
    }

    pub fn get_data_with_rng<R: Rng + ?Sized>(&self, reps: usize, rng: &mut R) -> Vec<u64> {
        self.distribution().sample_n(reps, rng)
    }

    /// Probability of observing exactly `count` decays in one run.
    pub fn get_likelihood(&self, count: u64) -> f64 {
        self.distribution().pmf(count)
    }

    /// Joint log-likelihood of a series of independent runs.
    ///
    /// Returns 0 for an empty series and `-inf` if any observation is
    /// impossible under the current configuration.
    pub fn get_log_likelihood(&self, counts: &[u64]) -> f64 {
        let dist = self.distribution();
        counts.iter().map(|&c| dist.ln_pmf(c)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn defaults() {
        let c = SimulatedRadiationCounter::default();
        assert_eq!(c.counting_time(), 10.0);
        assert_eq!(c.efficiency(), 1.0);
        assert_eq!(c.background(), 0.0);
        assert!(c.source().is_none());
        assert_eq!(c.expected_counts(), 0.0);
    }

    #[test]
    fn constructor_rejects_invalid_config() {
        let c = SimulatedRadiationCounter::new(1.5, -2.0);
        assert_eq!(c.efficiency(), 1.0);
        assert_eq!(c.background(), 0.0);
    }

    #[test]
    fn counting_time_rejects_negative_and_non_finite() {
        let mut c = SimulatedRadiationCounter::default();
        assert_eq!(
            c.set_counting_time(-1.0),
            Err(ValidationError::NegativeCountingTime(-1.0))
        );
        assert_eq!(c.counting_time(), 10.0);
        assert!(c.set_counting_time(f64::NAN).is_err());
        assert!(c.set_counting_time(f64::INFINITY).is_err());
        assert_eq!(c.counting_time(), 10.0);
        // No upper bound on the simulator.
        assert!(c.set_counting_time(3600.0).is_ok());
        assert_eq!(c.counting_time(), 3600.0);
        assert!(c.set_counting_time(0.0).is_ok());
        assert_eq!(c.counting_time(), 0.0);
    }

    #[test]
    fn efficiency_bounds() {
        let mut c = SimulatedRadiationCounter::default();
        assert!(c.set_efficiency(1.5).is_err());
        assert_eq!(c.efficiency(), 1.0);
        assert!(c.set_efficiency(-0.1).is_err());
        assert_eq!(c.efficiency(), 1.0);
        assert!(c.set_efficiency(f64::NAN).is_err());
        assert_eq!(c.efficiency(), 1.0);
        assert!(c.set_efficiency(0.5).is_ok());
        assert_eq!(c.efficiency(), 0.5);
        assert!(c.set_efficiency(0.0).is_ok());
        assert!(c.set_efficiency(1.0).is_ok());
    }

    #[test]
    fn background_bounds() {
        let mut c = SimulatedRadiationCounter::default();
        assert_eq!(
            c.set_background(-0.5),
            Err(ValidationError::NegativeBackground(-0.5))
        );
        assert!(c.set_background(f64::INFINITY).is_err());
        assert_eq!(c.background(), 0.0);
        assert!(c.set_background(2.5).is_ok());
        assert_eq!(c.background(), 2.5);
    }

    #[test]
    fn insert_replaces_source() {
        let mut c = SimulatedRadiationCounter::default();
        c.insert_calibration_source(RadioactiveSource::new(5.0));
        c.insert_calibration_source(RadioactiveSource::new(8.0));
        assert_eq!(c.source().map(|s| s.activity()), Some(8.0));
    }

    #[test]
    fn expected_counts_formula() {
        let mut c = SimulatedRadiationCounter::new(0.5, 1.0);
        c.insert_calibration_source(RadioactiveSource::new(50.0));
        assert_eq!(c.expected_counts(), 30.0 * 10.0 * 0.5 + 1.0 * 10.0);
        assert_eq!(c.expected_counts(), 160.0);
    }

    #[test]
    fn zero_activity_yields_zero_counts() {
        let mut c = SimulatedRadiationCounter::new(1.0, 0.0);
        c.insert_calibration_source(RadioactiveSource::new(0.0));
        let data = c.get_data(1000);
        assert_eq!(data.len(), 1000);
        assert!(data.iter().all(|&x| x == 0));
        assert_eq!(c.get_likelihood(0), 1.0);
        assert_eq!(c.get_likelihood(1), 0.0);
    }

    #[test]
    fn likelihood_at_mode() {
        let mut c = SimulatedRadiationCounter::new(0.5, 1.0);
        c.insert_calibration_source(RadioactiveSource::new(50.0));
        let l = c.get_likelihood(160);
        assert!(l > 0.0 && l < 1.0);
        // Near the mode the pmf is about 1/sqrt(2πλ).
        let approx = 1.0 / (2.0 * std::f64::consts::PI * 160.0).sqrt();
        assert!((l - approx).abs() / approx < 0.01, "pmf {l}");
        assert!(l > c.get_likelihood(140));
        assert!(l > c.get_likelihood(180));
    }

    #[test]
    fn get_data_length_and_mean() {
        let mut c = SimulatedRadiationCounter::new(1.0, 0.5);
        c.insert_calibration_source(RadioactiveSource::new(2.0));
        assert_eq!(c.get_data(0).len(), 0);
        assert_eq!(c.get_data(2).len(), 2);

        let mut rng = StdRng::seed_from_u64(7);
        let data = c.get_data_with_rng(5000, &mut rng);
        let mean = data.iter().sum::<u64>() as f64 / data.len() as f64;
        assert!((mean - 25.0).abs() < 0.5, "mean {mean}");
    }

    #[test]
    fn high_rate_long_run_does_not_stall() {
        let mut c = SimulatedRadiationCounter::new(1.0, 1e5);
        c.set_counting_time(1e4).unwrap();
        assert_eq!(c.expected_counts(), 1e9);

        let started = std::time::Instant::now();
        let data = c.get_data(2);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
        // 20 standard deviations either side.
        assert!(data.iter().all(|&x| x.abs_diff(1_000_000_000) < 640_000), "{data:?}");
    }

    #[test]
    fn log_likelihood_sums_terms() {
        let c = SimulatedRadiationCounter::new(1.0, 1.0);
        let counts = [8, 10, 12];
        let want: f64 = counts.iter().map(|&k| c.get_likelihood(k).ln()).sum();
        assert!((c.get_log_likelihood(&counts) - want).abs() < 1e-9);
        assert_eq!(c.get_log_likelihood(&[]), 0.0);

        let silent = SimulatedRadiationCounter::default();
        assert_eq!(silent.get_log_likelihood(&[0, 0]), 0.0);
        assert_eq!(silent.get_log_likelihood(&[0, 1]), f64::NEG_INFINITY);
    }
}

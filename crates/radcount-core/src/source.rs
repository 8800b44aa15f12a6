//! Calibration sources of known activity.

/// Activity of the most active calibration source available, in Bq.
///
/// The counting service applies the same ceiling, so the two must change
/// together.
pub const MAX_CALIBRATION_SOURCE_ACTIVITY: f64 = 30.0;

/// What [`RadioactiveSource::set_activity`] did with the requested value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityStatus {
    /// Stored as given.
    Accepted,
    /// Negative or NaN; stored as zero.
    ClampedToZero,
    /// Above [`MAX_CALIBRATION_SOURCE_ACTIVITY`]; stored as the maximum.
    ClampedToMax,
}

/// A calibration source with a known decay rate.
///
/// Activity is always within `[0, MAX_CALIBRATION_SOURCE_ACTIVITY]`.
/// Out-of-range requests are corrected and logged, never rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadioactiveSource {
    activity: f64,
}

impl RadioactiveSource {
    pub fn new(activity: f64) -> Self {
        let mut source = Self { activity: 0.0 };
        source.set_activity(activity);
        source
    }

    /// Activity in Bq (decays per second).
    pub fn activity(&self) -> f64 {
        self.activity
    }

    pub fn set_activity(&mut self, activity: f64) -> ActivityStatus {
        if activity.is_nan() || activity < 0.0 {
            log::warn!(
                "calibration source activity must not be negative (got {activity}); its activity is set to zero"
            );
            self.activity = 0.0;
            ActivityStatus::ClampedToZero
        } else if activity > MAX_CALIBRATION_SOURCE_ACTIVITY {
            log::warn!(
                "requested activity {activity} Bq is higher than the most active source available; \
                 the activity of the source is set to {MAX_CALIBRATION_SOURCE_ACTIVITY} Bq"
            );
            self.activity = MAX_CALIBRATION_SOURCE_ACTIVITY;
            ActivityStatus::ClampedToMax
        } else {
            self.activity = activity;
            ActivityStatus::Accepted
        }
    }
}

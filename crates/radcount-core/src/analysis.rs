//! Summary statistics for a series of counting runs.
//!
//! Besides mean and spread, the summary carries the Poisson dispersion
//! test: for Poisson data `Σ(x - x̄)² / x̄` follows a chi-squared
//! distribution with `n - 1` degrees of freedom, so a tiny p-value means
//! the runs scatter more (or less) than counting statistics allow.

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSummary {
    pub n: usize,
    pub mean: f64,
    /// Unbiased sample variance (0 for a single run).
    pub variance: f64,
    /// Standard error of the mean.
    pub std_error: f64,
    /// `Σ(x - x̄)² / x̄`; 0 when the mean is 0.
    pub dispersion_index: f64,
    /// Two-sided p-value of the dispersion test. `None` with fewer than two
    /// runs or a zero mean.
    pub dispersion_p_value: Option<f64>,
}

/// Summarize counting runs. `None` for an empty series.
pub fn summarize(counts: &[u64]) -> Option<SampleSummary> {
    if counts.is_empty() {
        return None;
    }
    let n = counts.len();
    let mean = counts.iter().map(|&c| c as f64).sum::<f64>() / n as f64;
    let sum_sq: f64 = counts
        .iter()
        .map(|&c| {
            let d = c as f64 - mean;
            d * d
        })
        .sum();
    let variance = if n > 1 { sum_sq / (n - 1) as f64 } else { 0.0 };
    let std_error = (variance / n as f64).sqrt();

    let (dispersion_index, dispersion_p_value) = if mean > 0.0 {
        let d = sum_sq / mean;
        (d, dispersion_p_value(d, n))
    } else {
        (0.0, None)
    };

    Some(SampleSummary {
        n,
        mean,
        variance,
        std_error,
        dispersion_index,
        dispersion_p_value,
    })
}

fn dispersion_p_value(statistic: f64, n: usize) -> Option<f64> {
    if n < 2 {
        return None;
    }
    let dist = ChiSquared::new((n - 1) as f64).ok()?;
    let lower = dist.cdf(statistic);
    let upper = dist.sf(statistic);
    Some((2.0 * lower.min(upper)).min(1.0))
}

//! Poisson counting statistics.
//!
//! Wraps [`statrs::distribution::Poisson`] for the PMF and
//! [`rand_distr::Poisson`] for sampling, with the degenerate zero-mean case
//! (a detector with no source and no background always reads zero) that
//! neither crate will construct.

use rand::Rng;
use rand_distr::Distribution;
use statrs::distribution::{Discrete, Poisson};

/// Poisson distribution of the number of counts in one counting window.
#[derive(Debug, Clone)]
pub struct CountDistribution {
    mean: f64,
    model: Option<Model>,
}

#[derive(Debug, Clone)]
struct Model {
    exact: Poisson,
    sampler: rand_distr::Poisson<f64>,
}

impl CountDistribution {
    /// Build the distribution for an expected number of counts.
    ///
    /// Negative, NaN or infinite means collapse to zero; the counters never
    /// produce them because every input is validated first.
    pub fn new(mean: f64) -> Self {
        let zero = Self {
            mean: 0.0,
            model: None,
        };
        if !mean.is_finite() || mean <= 0.0 {
            return zero;
        }
        let exact = match Poisson::new(mean) {
            Ok(exact) => exact,
            Err(e) => {
                log::warn!("cannot model Poisson mean {mean}: {e}; treating it as zero");
                return zero;
            }
        };
        let sampler = match rand_distr::Poisson::new(mean) {
            Ok(sampler) => sampler,
            Err(e) => {
                log::warn!("cannot sample Poisson mean {mean}: {e}; treating it as zero");
                return zero;
            }
        };
        Self {
            mean,
            model: Some(Model { exact, sampler }),
        }
    }

    /// Expected number of counts (λ).
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Probability of observing exactly `count` decays.
    pub fn pmf(&self, count: u64) -> f64 {
        match &self.model {
            Some(m) => m.exact.pmf(count),
            None if count == 0 => 1.0,
            None => 0.0,
        }
    }

    /// Natural log of [`pmf`](Self::pmf); `-inf` for impossible counts.
    pub fn ln_pmf(&self, count: u64) -> f64 {
        match &self.model {
            Some(m) => m.exact.ln_pmf(count),
            None if count == 0 => 0.0,
            None => f64::NEG_INFINITY,
        }
    }

    /// Draw one count.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        match &self.model {
            // Draws are whole numbers below 2^64.
            Some(m) => m.sampler.sample(rng) as u64,
            None => 0,
        }
    }

    /// Draw `n` independent counts.
    pub fn sample_n<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<u64> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}

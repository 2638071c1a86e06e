//! Componentwise tail masses `P(X ≥ a)`.
//!
//! The one-dimensional case is the Student-t survival function. Higher
//! dimensions use the separation-of-variables sampler of Genz: each replicate
//! walks the coordinates through the Cholesky factor, accumulating the
//! conditional tail weight and drawing the next coordinate from the truncated
//! normal that remains. The estimate is the average of the accumulated
//! weights.

use faer::Col;
use rand::Rng;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};

use crate::distributions::{DistributionError, MultivariateT};
use crate::utils::matrix::cholesky_lower;

/// Replicates beyond this add nothing visible at f64 precision.
pub(crate) const MAX_SOV_REPLICATES: usize = 25_000;

impl MultivariateT {
    /// Probability that every coordinate weakly exceeds the matching entry of
    /// `lower`.
    ///
    /// `replicates` bounds the sampling effort; the one-dimensional case is
    /// evaluated exactly and consumes no randomness.
    pub fn tail_probability<R: Rng>(
        &self,
        lower: &Col<f64>,
        replicates: usize,
        rng: &mut R,
    ) -> Result<f64, DistributionError> {
        let d = self.dim();
        if lower.nrows() != d {
            return Err(DistributionError::DimensionMismatch {
                expected: d,
                got: lower.nrows(),
            });
        }

        if d == 1 {
            let variance = self.scale()[(0, 0)];
            if !(variance > 0.0) {
                return Err(DistributionError::NotPositiveDefinite);
            }
            let t = StudentsT::new(0.0, 1.0, self.df())
                .map_err(|_| DistributionError::InvalidDegreesOfFreedom(self.df()))?;
            let standardized = (lower[0] - self.location()[0]) / variance.sqrt();
            return Ok(1.0 - t.cdf(standardized));
        }

        let chol =
            cholesky_lower(self.scale()).map_err(|_| DistributionError::NotPositiveDefinite)?;
        let chi = ChiSquared::new(self.df())
            .map_err(|_| DistributionError::InvalidDegreesOfFreedom(self.df()))?;
        let normal = Normal::new(0.0, 1.0).expect("standard normal parameters are valid");
        let shifted = Col::from_fn(d, |i| lower[i] - self.location()[i]);

        let replicates = replicates.clamp(1, MAX_SOV_REPLICATES);
        let df = self.df();
        let mut total = 0.0;
        let mut y = vec![0.0_f64; d - 1];

        for _ in 0..replicates {
            let u0: f64 = rng.random();
            let radial = (chi.inverse_cdf(u0) / df).sqrt();
            let mut weight = 1.0_f64;
            for i in 0..d {
                let mut partial = radial * shifted[i];
                for j in 0..i {
                    partial -= chol[(i, j)] * y[j];
                }
                let edge = normal.cdf(partial / chol[(i, i)]);
                weight *= 1.0 - edge;
                if weight <= 0.0 {
                    weight = 0.0;
                    break;
                }
                if i + 1 < d {
                    let u: f64 = rng.random();
                    let inner = edge + u * (1.0 - edge);
                    let clamped = inner.clamp(f64::MIN_POSITIVE, 1.0 - f64::EPSILON / 2.0);
                    y[i] = normal.inverse_cdf(clamped);
                }
            }
            total += weight;
        }

        Ok(total / replicates as f64)
    }
}

//! Summary statistics of a fitted linear model.
//!
//! The test never sees the raw data. Everything it needs is the coefficient
//! vector, its covariance, the residual sum of squares, and the number of
//! observations, exactly as reported by whichever package fit the model.

use faer::{Col, Mat};
use std::collections::HashSet;

use crate::core::error::HypothesisError;

/// Fitted-model inputs for an informed-hypothesis test.
#[derive(Debug, Clone)]
pub struct LinearModelStats {
    parameter_names: Vec<String>,
    coefficients: Col<f64>,
    covariance: Mat<f64>,
    rss: f64,
    n_observations: usize,
}

impl LinearModelStats {
    /// Validates and stores the reported summary statistics.
    ///
    /// `covariance` is the estimated covariance of `coefficients`, already
    /// scaled by the residual variance.
    pub fn new(
        parameter_names: Vec<String>,
        coefficients: Col<f64>,
        covariance: Mat<f64>,
        rss: f64,
        n_observations: usize,
    ) -> Result<Self, HypothesisError> {
        let k = parameter_names.len();
        if k == 0 {
            return Err(HypothesisError::EmptyParameterName);
        }
        let mut seen = HashSet::with_capacity(k);
        for name in &parameter_names {
            if name.is_empty() {
                return Err(HypothesisError::EmptyParameterName);
            }
            if !seen.insert(name.as_str()) {
                return Err(HypothesisError::DuplicateParameterName(name.clone()));
            }
        }
        if coefficients.nrows() != k {
            return Err(HypothesisError::DimensionMismatch {
                what: "coefficients",
                expected: k,
                got: coefficients.nrows(),
            });
        }
        if covariance.nrows() != k || covariance.ncols() != k {
            return Err(HypothesisError::DimensionMismatch {
                what: "covariance dimensions",
                expected: k,
                got: covariance.nrows().max(covariance.ncols()),
            });
        }
        if !rss.is_finite() || rss <= 0.0 {
            return Err(HypothesisError::InvalidRss(rss));
        }
        if n_observations <= k {
            return Err(HypothesisError::InsufficientObservations {
                needed: k + 1,
                got: n_observations,
            });
        }
        Ok(Self {
            parameter_names,
            coefficients,
            covariance,
            rss,
            n_observations,
        })
    }

    /// Builds the statistics from `(XᵀX)⁻¹` instead of a finished covariance,
    /// applying the usual `rss / (n - k)` residual-variance scaling.
    pub fn from_xtx_inverse(
        parameter_names: Vec<String>,
        coefficients: Col<f64>,
        xtx_inverse: Mat<f64>,
        rss: f64,
        n_observations: usize,
    ) -> Result<Self, HypothesisError> {
        let k = parameter_names.len();
        if k > 0 && n_observations <= k {
            return Err(HypothesisError::InsufficientObservations {
                needed: k + 1,
                got: n_observations,
            });
        }
        let sigma2 = rss / (n_observations - k) as f64;
        let covariance = Mat::from_fn(xtx_inverse.nrows(), xtx_inverse.ncols(), |i, j| {
            sigma2 * xtx_inverse[(i, j)]
        });
        Self::new(parameter_names, coefficients, covariance, rss, n_observations)
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    pub fn coefficients(&self) -> &Col<f64> {
        &self.coefficients
    }

    pub fn covariance(&self) -> &Mat<f64> {
        &self.covariance
    }

    pub fn rss(&self) -> f64 {
        self.rss
    }

    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    pub fn n_parameters(&self) -> usize {
        self.parameter_names.len()
    }

    pub fn residual_df(&self) -> f64 {
        (self.n_observations - self.n_parameters()) as f64
    }
}

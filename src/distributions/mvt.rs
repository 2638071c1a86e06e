//! Multivariate Student-t distribution.
//!
//! Both the posterior of the coefficient vector and its fractional prior are
//! multivariate t; every Bayes-factor branch reduces to a combination of the
//! operations here: affine images, conditioning, densities and samples.

use faer::{Col, Mat};
use rand::Rng;
use rand_distr::{ChiSquared, Distribution, StandardNormal};
use statrs::function::gamma::ln_gamma;

use crate::distributions::DistributionError;
use crate::utils::matrix::{block, cholesky_lower, forward_substitute, invert_qr, segment};

/// Draws are produced in blocks of this many rows so large replicate counts
/// keep a flat memory profile.
pub(crate) const SAMPLE_CHUNK: usize = 65_536;

/// Multivariate Student-t with location vector, scale matrix and degrees of
/// freedom.
///
/// The scale matrix is the squared-scale parameter, not the covariance; the
/// covariance is `scale * df / (df - 2)` when `df > 2`. Operations return new
/// distributions and never mutate in place.
#[derive(Debug, Clone)]
pub struct MultivariateT {
    location: Col<f64>,
    scale: Mat<f64>,
    df: f64,
}

impl MultivariateT {
    pub fn new(location: Col<f64>, scale: Mat<f64>, df: f64) -> Result<Self, DistributionError> {
        if scale.nrows() != scale.ncols() {
            return Err(DistributionError::NonSquareScale);
        }
        if scale.nrows() != location.nrows() {
            return Err(DistributionError::DimensionMismatch {
                expected: location.nrows(),
                got: scale.nrows(),
            });
        }
        if !df.is_finite() || df <= 0.0 {
            return Err(DistributionError::InvalidDegreesOfFreedom(df));
        }
        Ok(Self {
            location,
            scale,
            df,
        })
    }

    pub fn dim(&self) -> usize {
        self.location.nrows()
    }

    pub fn location(&self) -> &Col<f64> {
        &self.location
    }

    pub fn scale(&self) -> &Mat<f64> {
        &self.scale
    }

    pub fn df(&self) -> f64 {
        self.df
    }

    /// Natural logarithm of the density at `x`.
    ///
    /// The Mahalanobis term and the log-determinant both come from the
    /// Cholesky factor of the scale, so the scale is never inverted
    /// explicitly.
    pub fn log_density(&self, x: &Col<f64>) -> Result<f64, DistributionError> {
        let d = self.dim();
        if x.nrows() != d {
            return Err(DistributionError::DimensionMismatch {
                expected: d,
                got: x.nrows(),
            });
        }
        let chol =
            cholesky_lower(&self.scale).map_err(|_| DistributionError::NotPositiveDefinite)?;
        let diff = Col::from_fn(d, |i| x[i] - self.location[i]);
        let whitened = forward_substitute(&chol, &diff);
        let mahalanobis: f64 = (0..d).map(|i| whitened[i] * whitened[i]).sum();
        let log_det: f64 = 2.0 * (0..d).map(|i| chol[(i, i)].ln()).sum::<f64>();

        let df = self.df;
        let dd = d as f64;
        Ok(ln_gamma((df + dd) / 2.0)
            - ln_gamma(df / 2.0)
            - 0.5 * dd * (df * std::f64::consts::PI).ln()
            - 0.5 * log_det
            - 0.5 * (df + dd) * (1.0 + mahalanobis / df).ln())
    }

    /// Image under `x -> A x`: location `A μ`, scale `A Σ Aᵀ`, unchanged
    /// degrees of freedom.
    pub fn linear_map(&self, a: &Mat<f64>) -> Result<Self, DistributionError> {
        if a.ncols() != self.dim() {
            return Err(DistributionError::DimensionMismatch {
                expected: self.dim(),
                got: a.ncols(),
            });
        }
        let location = a * &self.location;
        let scale = a * &self.scale * a.transpose();
        Self::new(location, scale, self.df)
    }

    /// Distribution of the trailing coordinates given that the first `q`
    /// coordinates equal `value`.
    ///
    /// Degrees of freedom grow to `df + q` and the conditional scale picks up
    /// the factor `(df + δ) / (df + q)`, where `δ` is the Mahalanobis
    /// distance of `value` in the conditioned block.
    pub fn condition(&self, q: usize, value: &Col<f64>) -> Result<Self, DistributionError> {
        let d = self.dim();
        if q == 0 || q >= d {
            return Err(DistributionError::DimensionMismatch { expected: d, got: q });
        }
        if value.nrows() != q {
            return Err(DistributionError::DimensionMismatch {
                expected: q,
                got: value.nrows(),
            });
        }

        let s11 = block(&self.scale, 0, 0, q, q);
        let s12 = block(&self.scale, 0, q, q, d - q);
        let s21 = block(&self.scale, q, 0, d - q, q);
        let s22 = block(&self.scale, q, q, d - q, d - q);
        let s11_inv = invert_qr(&s11).map_err(|_| DistributionError::SingularScale)?;

        let diff = Col::from_fn(q, |i| value[i] - self.location[i]);
        let weighted = &s11_inv * &diff;
        let delta: f64 = (0..q).map(|i| diff[i] * weighted[i]).sum();

        let tail_location = segment(&self.location, q, d - q);
        let shift = &s21 * &weighted;
        let location = Col::from_fn(d - q, |i| tail_location[i] + shift[i]);

        let reduced = &s22 - &s21 * &s11_inv * &s12;
        let factor = (self.df + delta) / (self.df + q as f64);
        let scale = Mat::from_fn(d - q, d - q, |i, j| factor * reduced[(i, j)]);

        Self::new(location, scale, self.df + q as f64)
    }

    /// `count` draws, one per row, via the scale-mixture representation
    /// `x = μ + (L z) sqrt(df / w)` with `z` standard normal and `w ~ χ²_df`.
    pub fn sample<R: Rng>(&self, count: usize, rng: &mut R) -> Result<Mat<f64>, DistributionError> {
        let d = self.dim();
        let chol =
            cholesky_lower(&self.scale).map_err(|_| DistributionError::NotPositiveDefinite)?;
        let chi = ChiSquared::new(self.df)
            .map_err(|_| DistributionError::InvalidDegreesOfFreedom(self.df))?;

        let mut draws = Mat::zeros(count, d);
        let mut start = 0;
        while start < count {
            let len = SAMPLE_CHUNK.min(count - start);
            let mut z: Mat<f64> = Mat::zeros(len, d);
            for i in 0..len {
                for j in 0..d {
                    z[(i, j)] = rng.sample(StandardNormal);
                }
            }
            let correlated = z * chol.transpose();
            for i in 0..len {
                let w: f64 = chi.sample(rng);
                let radial = (self.df / w).sqrt();
                for j in 0..d {
                    draws[(start + i, j)] = self.location[j] + correlated[(i, j)] * radial;
                }
            }
            start += len;
        }
        Ok(draws)
    }
}

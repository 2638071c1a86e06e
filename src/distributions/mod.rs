//! Probability distributions used by the testing engine.

pub mod mvt;
pub mod tail;

pub use mvt::MultivariateT;

pub(crate) use mvt::SAMPLE_CHUNK;

use thiserror::Error;

/// Errors from distribution construction or evaluation.
#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("degrees of freedom must be positive and finite, got {0}")]
    InvalidDegreesOfFreedom(f64),

    #[error("scale matrix must be square")]
    NonSquareScale,

    #[error("scale matrix is not positive definite")]
    NotPositiveDefinite,

    #[error("scale matrix is singular or nearly singular")]
    SingularScale,
}

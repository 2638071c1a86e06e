//! Core types for informed-hypothesis testing.

pub mod error;
pub mod model;
pub mod options;
pub mod result;

pub use error::HypothesisError;
pub use model::LinearModelStats;
pub use options::{OptionsError, TestOptions, DEFAULT_MONTE_CARLO_REPS, DEFAULT_SEED};
pub use result::InformedTestResult;

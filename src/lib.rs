//! Bayesian evaluation of informed hypotheses on linear-model coefficients.
//!
//! An informed hypothesis is an ordering or equality statement on named
//! regression coefficients, written as a string such as `"a > b"` or
//! `"(a, b) > c; a = b"`. Each `;`-separated hypothesis is turned into
//! constraint matrices, scored with a fractional-prior Bayes factor against
//! the unconstrained model, and compared with the others and with the
//! complement of their union.
//!
//! The input is not raw data but the summary statistics any least-squares
//! fit reports: coefficient estimates, their covariance, the residual sum
//! of squares, and the number of observations.
//!
//! # Example
//!
//! ```rust
//! use faer::{Col, Mat};
//! use hypotest::prelude::*;
//!
//! let names = vec!["age".to_string(), "dose".to_string()];
//! let coefficients = Col::from_fn(2, |i| [0.45, 0.12][i]);
//! let covariance = Mat::from_fn(2, 2, |i, j| if i == j { 0.015 } else { 0.003 });
//! let model = LinearModelStats::new(names, coefficients, covariance, 18.0, 90)?;
//!
//! let result = hypotest::test(&model, "age > dose; age = dose")?;
//! for (label, probability) in result.labels().iter().zip(result.posterior_probabilities()) {
//!     println!("{label}: {probability:.3}");
//! }
//! # Ok::<(), hypotest::HypothesisError>(())
//! ```

pub mod core;
pub mod distributions;
pub mod engine;
pub mod hypothesis;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        HypothesisError, InformedTestResult, LinearModelStats, OptionsError, TestOptions,
    };
    pub use crate::engine::{ComplementFactor, InformedTest, InformedTestBuilder};
    pub use crate::hypothesis::{Hypothesis, HypothesisKind, SymbolTable};
}

pub use crate::core::{
    HypothesisError, InformedTestResult, LinearModelStats, OptionsError, TestOptions,
};
pub use crate::engine::{ComplementFactor, InformedTest, InformedTestBuilder};

/// Runs an informed-hypothesis test with default options.
///
/// Equivalent to `InformedTest::default().test(model, hypotheses)`.
pub fn test(
    model: &LinearModelStats,
    hypotheses: &str,
) -> Result<InformedTestResult, HypothesisError> {
    InformedTest::default().test(model, hypotheses)
}

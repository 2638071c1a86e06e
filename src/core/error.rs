//! Crate-wide error type.

use thiserror::Error;

use crate::core::options::OptionsError;
use crate::distributions::DistributionError;

/// Errors that can occur while parsing hypothesis strings or evaluating them
/// against a fitted model.
///
/// Parse errors carry the offending token or sub-hypothesis so callers can
/// point the user at the exact fragment that failed.
#[derive(Debug, Error)]
pub enum HypothesisError {
    // Hypothesis string parsing
    #[error("illegal character '{0}' in hypothesis string")]
    IllegalCharacter(char),

    #[error("hypothesis '{0}' contains no comparison operator")]
    NoComparison(String),

    #[error("consecutive comparison operators in '{0}'")]
    ConsecutiveOperators(String),

    #[error("comparison operator without operand in '{0}'")]
    MissingOperand(String),

    #[error("empty hypothesis between separators")]
    EmptySubHypothesis,

    #[error("malformed parentheses in '{0}'")]
    MalformedParenthesis(String),

    #[error("misplaced comma in '{0}'")]
    MisplacedComma(String),

    #[error("cannot interpret '{0}' as a parameter or numeric value")]
    InvalidToken(String),

    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("comparison between two numeric values in '{0}'")]
    ValueComparison(String),

    // Constraint geometry
    #[error("constraints in '{0}' admit no common boundary point")]
    InconsistentConstraints(String),

    #[error("matrix is singular or nearly singular")]
    SingularMatrix,

    // Model statistics
    #[error("dimension mismatch: expected {expected} {what}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("duplicate parameter name '{0}'")]
    DuplicateParameterName(String),

    #[error("parameter names must be present and non-empty")]
    EmptyParameterName,

    #[error("residual sum of squares must be positive and finite, got {0}")]
    InvalidRss(f64),

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("fractional prior degrees of freedom must be positive, got {0}")]
    PriorDegreesOfFreedom(f64),

    // Nested errors
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),

    #[error("distribution error: {0}")]
    Distribution(#[from] DistributionError),

    #[error("numerical error: {0}")]
    NumericalError(String),
}

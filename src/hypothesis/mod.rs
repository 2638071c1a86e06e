//! Hypothesis-string grammar: tokens, parser and constraint construction.

pub mod constraints;
pub mod parser;
pub mod rows;

pub use constraints::{ConstraintSet, Hypothesis, HypothesisKind};
pub use parser::{parse, ParsedHypothesis};
pub use rows::{ComparisonRow, Operator, SymbolTable, Term};

//! Token-level value types for the hypothesis grammar.

use std::collections::HashMap;

use crate::core::error::HypothesisError;

/// Comparison operators recognized in hypothesis strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Greater,
    Less,
    Equal,
}

impl Operator {
    pub(crate) fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Self::Greater),
            '<' => Some(Self::Less),
            '=' => Some(Self::Equal),
            _ => None,
        }
    }

    pub fn is_equality(self) -> bool {
        matches!(self, Self::Equal)
    }
}

/// One side of a comparison after name resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Term {
    /// Column index of a model parameter.
    Parameter(usize),
    /// Numeric literal.
    Literal(f64),
}

/// A single comparison between two terms, after all comma and parenthesis
/// expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonRow {
    pub left: Term,
    pub op: Operator,
    pub right: Term,
}

/// Parameter-name lookup for token resolution; keeps the column order of the
/// fitted model.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    /// Builds the table; names must be unique and non-empty.
    pub fn new(names: &[String]) -> Result<Self, HypothesisError> {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(HypothesisError::EmptyParameterName);
            }
            if index.insert(name.clone(), i).is_some() {
                return Err(HypothesisError::DuplicateParameterName(name.clone()));
            }
        }
        Ok(Self {
            names: names.to_vec(),
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Column index of an exactly matching parameter name.
    pub fn resolve(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Resolves a token: parameter name first, then numeric literal.
    ///
    /// Any unmatched token containing a letter is treated as a misspelled
    /// parameter rather than a number, so `1e-3` is not a valid literal here.
    pub(crate) fn term(&self, token: &str) -> Result<Term, HypothesisError> {
        if let Some(index) = self.resolve(token) {
            return Ok(Term::Parameter(index));
        }
        if token.chars().any(|c| c.is_alphabetic()) {
            return Err(HypothesisError::UnknownParameter(token.to_string()));
        }
        token
            .parse::<f64>()
            .map(Term::Literal)
            .map_err(|_| HypothesisError::InvalidToken(token.to_string()))
    }
}

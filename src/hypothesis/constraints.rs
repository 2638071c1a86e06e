//! Constraint matrices assembled from comparison rows.

use faer::{Col, Mat};

use crate::core::error::HypothesisError;
use crate::hypothesis::parser::ParsedHypothesis;
use crate::hypothesis::rows::{ComparisonRow, Operator, Term};
use crate::utils::matrix::{concat, vstack};

/// Rows of one kind over the model parameters.
///
/// Equality rows read `R β = r`; inequality rows are normalized during
/// encoding so they always read `R β ≥ r`.
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    matrix: Mat<f64>,
    rhs: Col<f64>,
}

impl ConstraintSet {
    pub(crate) fn from_parts(matrix: Mat<f64>, rhs: Col<f64>) -> Self {
        debug_assert_eq!(matrix.nrows(), rhs.nrows());
        Self { matrix, rhs }
    }

    fn from_rows(rows: &[AugmentedRow], parameters: usize) -> Self {
        let matrix = Mat::from_fn(rows.len(), parameters, |i, j| rows[i].coefficients[j]);
        let rhs = Col::from_fn(rows.len(), |i| rows[i].rhs);
        Self { matrix, rhs }
    }

    pub fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn parameters(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn matrix(&self) -> &Mat<f64> {
        &self.matrix
    }

    pub fn rhs(&self) -> &Col<f64> {
        &self.rhs
    }

    /// Whether row `draw` of `draws` weakly satisfies every constraint row.
    pub(crate) fn satisfied_by_row(&self, draws: &Mat<f64>, draw: usize) -> bool {
        for i in 0..self.rows() {
            let mut lhs = 0.0;
            for j in 0..self.parameters() {
                lhs += self.matrix[(i, j)] * draws[(draw, j)];
            }
            if lhs < self.rhs[i] {
                return false;
            }
        }
        true
    }
}

/// One encoded row plus its kind, before the equality/inequality split.
struct AugmentedRow {
    coefficients: Vec<f64>,
    rhs: f64,
    equality: bool,
}

/// Encodes a comparison as coefficients over the parameters plus a target.
///
/// `<` rows flip the sign of the whole row, matrix and target together, so
/// every inequality comes out in `≥` orientation.
fn encode(
    row: &ComparisonRow,
    parameters: usize,
    context: &str,
) -> Result<AugmentedRow, HypothesisError> {
    let mut coefficients = vec![0.0; parameters];
    let equality = row.op.is_equality();
    let rhs = match (row.left, row.op, row.right) {
        (Term::Literal(_), _, Term::Literal(_)) => {
            return Err(HypothesisError::ValueComparison(context.to_string()));
        }
        (Term::Parameter(i), Operator::Equal, Term::Literal(v))
        | (Term::Literal(v), Operator::Equal, Term::Parameter(i)) => {
            coefficients[i] = 1.0;
            v
        }
        (Term::Parameter(i), Operator::Equal, Term::Parameter(j)) => {
            coefficients[i] += 1.0;
            coefficients[j] -= 1.0;
            0.0
        }
        (Term::Parameter(i), Operator::Greater, Term::Literal(v))
        | (Term::Literal(v), Operator::Less, Term::Parameter(i)) => {
            coefficients[i] = 1.0;
            v
        }
        (Term::Parameter(i), Operator::Less, Term::Literal(v))
        | (Term::Literal(v), Operator::Greater, Term::Parameter(i)) => {
            coefficients[i] = -1.0;
            -v
        }
        (Term::Parameter(i), Operator::Greater, Term::Parameter(j)) => {
            coefficients[i] += 1.0;
            coefficients[j] -= 1.0;
            0.0
        }
        (Term::Parameter(i), Operator::Less, Term::Parameter(j)) => {
            coefficients[i] -= 1.0;
            coefficients[j] += 1.0;
            0.0
        }
    };
    Ok(AugmentedRow {
        coefficients,
        rhs,
        equality,
    })
}

/// Kind of constraint content a hypothesis carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HypothesisKind {
    Equality,
    Inequality,
    Mixed,
}

/// One sub-hypothesis as constraint matrices.
#[derive(Debug, Clone)]
pub struct Hypothesis {
    text: String,
    equalities: Option<ConstraintSet>,
    inequalities: Option<ConstraintSet>,
}

impl Hypothesis {
    /// Encodes parsed comparison rows over `parameters` columns.
    pub fn from_parsed(
        parsed: &ParsedHypothesis,
        parameters: usize,
    ) -> Result<Self, HypothesisError> {
        if parsed.rows.is_empty() {
            return Err(HypothesisError::NoComparison(parsed.text.clone()));
        }
        let mut equality_rows = Vec::new();
        let mut inequality_rows = Vec::new();
        for row in &parsed.rows {
            let encoded = encode(row, parameters, &parsed.text)?;
            if encoded.equality {
                equality_rows.push(encoded);
            } else {
                inequality_rows.push(encoded);
            }
        }
        let equalities =
            (!equality_rows.is_empty()).then(|| ConstraintSet::from_rows(&equality_rows, parameters));
        let inequalities = (!inequality_rows.is_empty())
            .then(|| ConstraintSet::from_rows(&inequality_rows, parameters));
        Ok(Self {
            text: parsed.text.clone(),
            equalities,
            inequalities,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> HypothesisKind {
        match (&self.equalities, &self.inequalities) {
            (Some(_), None) => HypothesisKind::Equality,
            (None, Some(_)) => HypothesisKind::Inequality,
            (Some(_), Some(_)) => HypothesisKind::Mixed,
            (None, None) => unreachable!("construction requires at least one comparison row"),
        }
    }

    pub fn equalities(&self) -> Option<&ConstraintSet> {
        self.equalities.as_ref()
    }

    pub fn inequalities(&self) -> Option<&ConstraintSet> {
        self.inequalities.as_ref()
    }

    /// All rows stacked, equalities first; the anchor computation treats both
    /// kinds as boundaries.
    pub(crate) fn combined(&self) -> (Mat<f64>, Col<f64>) {
        match (&self.equalities, &self.inequalities) {
            (Some(eq), Some(ineq)) => (
                vstack(eq.matrix(), ineq.matrix()),
                concat(eq.rhs(), ineq.rhs()),
            ),
            (Some(eq), None) => (eq.matrix().clone(), eq.rhs().clone()),
            (None, Some(ineq)) => (ineq.matrix().clone(), ineq.rhs().clone()),
            (None, None) => unreachable!("construction requires at least one comparison row"),
        }
    }
}

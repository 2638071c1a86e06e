//! Fractional-prior construction.
//!
//! The prior spends a minimal training fraction `b = g (k + 1) / n` of the
//! data's information. Prior and posterior are both multivariate t over the
//! coefficients and share the `(XᵀX)⁻¹` geometry; they differ in degrees of
//! freedom, `g (k + 1) - k` against `n - k`, and in location: the posterior
//! sits at the estimates, the prior is centered per hypothesis on the
//! constraint boundary.

use faer::{Col, Mat};

use crate::core::error::HypothesisError;
use crate::core::model::LinearModelStats;
use crate::core::options::TestOptions;
use crate::distributions::MultivariateT;
use crate::hypothesis::Hypothesis;
use crate::utils::matrix::{pseudo_inverse, rref_with_pivots};

/// Scale information shared by every hypothesis in one run.
#[derive(Debug, Clone)]
pub(crate) struct FractionalScales {
    posterior: MultivariateT,
    prior_scale: Mat<f64>,
    prior_df: f64,
}

impl FractionalScales {
    pub(crate) fn new(
        model: &LinearModelStats,
        options: &TestOptions,
    ) -> Result<Self, HypothesisError> {
        let k = model.n_parameters() as f64;
        let n = model.n_observations() as f64;

        let fraction = options.fraction * (k + 1.0) / n;
        let prior_df = n * fraction - k;
        if prior_df <= 0.0 {
            return Err(HypothesisError::PriorDegreesOfFreedom(prior_df));
        }
        let posterior_df = model.residual_df();

        // the posterior scale is exactly the reported coefficient covariance,
        // rss / (n - k) * (X'X)^-1; the prior rescales it by the df ratio
        let posterior = MultivariateT::new(
            model.coefficients().clone(),
            model.covariance().clone(),
            posterior_df,
        )?;
        let ratio = posterior_df / prior_df;
        let size = model.n_parameters();
        let prior_scale = Mat::from_fn(size, size, |i, j| model.covariance()[(i, j)] * ratio);

        Ok(Self {
            posterior,
            prior_scale,
            prior_df,
        })
    }

    pub(crate) fn posterior(&self) -> &MultivariateT {
        &self.posterior
    }

    /// Prior centered at the hypothesis anchor.
    pub(crate) fn prior_at(&self, anchor: &Col<f64>) -> Result<MultivariateT, HypothesisError> {
        Ok(MultivariateT::new(
            anchor.clone(),
            self.prior_scale.clone(),
            self.prior_df,
        )?)
    }
}

/// Minimal-norm point on every constraint boundary of the hypothesis,
/// `β₀ = R⁺ r` over the stacked rows.
///
/// The boundary system is checked for consistency first: a row of the
/// reduced `[R | r]` that is zero in the coefficients but not in the target
/// means the boundaries share no point, as in `0 < a < 1` whose two
/// boundaries `a = 0` and `a = 1` cannot both anchor the prior.
pub(crate) fn prior_anchor(
    hypothesis: &Hypothesis,
    tolerance: f64,
) -> Result<Col<f64>, HypothesisError> {
    let (matrix, rhs) = hypothesis.combined();
    let rows = matrix.nrows();
    let cols = matrix.ncols();

    let augmented = Mat::from_fn(rows, cols + 1, |i, j| {
        if j < cols {
            matrix[(i, j)]
        } else {
            rhs[i]
        }
    });
    let (reduced, _) = rref_with_pivots(&augmented, tolerance);
    for i in 0..rows {
        let coefficients_vanish = (0..cols).all(|j| reduced[(i, j)].abs() <= tolerance);
        if coefficients_vanish && reduced[(i, cols)].abs() > tolerance {
            return Err(HypothesisError::InconsistentConstraints(
                hypothesis.text().to_string(),
            ));
        }
    }

    let pinv =
        pseudo_inverse(&matrix, tolerance).map_err(|_| HypothesisError::SingularMatrix)?;
    Ok(&pinv * &rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypothesis::{parse, SymbolTable};
    use approx::assert_relative_eq;

    fn model() -> LinearModelStats {
        let names = vec!["a".to_string(), "b".to_string()];
        let coefficients = Col::from_fn(2, |i| [0.8, 0.2][i]);
        let covariance = Mat::from_fn(2, 2, |i, j| if i == j { 0.01 } else { 0.002 });
        LinearModelStats::new(names, coefficients, covariance, 4.5, 50).unwrap()
    }

    fn hypothesis(input: &str) -> Hypothesis {
        let names = vec!["a".to_string(), "b".to_string()];
        let symbols = SymbolTable::new(&names).unwrap();
        let parsed = parse(input, &symbols).unwrap();
        Hypothesis::from_parsed(&parsed[0], 2).unwrap()
    }

    #[test]
    fn test_minimal_fraction_gives_unit_prior_df() {
        let scales = FractionalScales::new(&model(), &TestOptions::default()).unwrap();
        assert_relative_eq!(scales.prior_df, 1.0, epsilon = 1e-12);
        assert_relative_eq!(scales.posterior().df(), 48.0);
    }

    #[test]
    fn test_fraction_multiplier_raises_prior_df() {
        let options = TestOptions {
            fraction: 2.0,
            ..TestOptions::default()
        };
        let scales = FractionalScales::new(&model(), &options).unwrap();
        // g (k + 1) - k with g = 2, k = 2
        assert_relative_eq!(scales.prior_df, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_prior_scale_is_df_rescaled_covariance() {
        let m = model();
        let scales = FractionalScales::new(&m, &TestOptions::default()).unwrap();
        let prior = scales.prior_at(&Col::zeros(2)).unwrap();
        // ratio (n - k) / prior_df = 48
        assert_relative_eq!(prior.scale()[(0, 0)], 0.48, epsilon = 1e-12);
        assert_relative_eq!(prior.scale()[(0, 1)], 0.096, epsilon = 1e-12);
        assert_relative_eq!(prior.df(), 1.0);
    }

    #[test]
    fn test_anchor_on_single_boundary() {
        let anchor = prior_anchor(&hypothesis("a>1"), 1e-10).unwrap();
        assert_relative_eq!(anchor[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(anchor[1], 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_anchor_of_contrast_is_origin() {
        let anchor = prior_anchor(&hypothesis("a>b"), 1e-10).unwrap();
        assert_relative_eq!(anchor[0], 0.0, epsilon = 1e-10);
        assert_relative_eq!(anchor[1], 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_anchor_combines_equality_and_inequality_rows() {
        let anchor = prior_anchor(&hypothesis("a=1,b>2"), 1e-10).unwrap();
        assert_relative_eq!(anchor[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(anchor[1], 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_interval_boundaries_are_inconsistent() {
        let err = prior_anchor(&hypothesis("0<a<1"), 1e-10).unwrap_err();
        assert!(matches!(err, HypothesisError::InconsistentConstraints(_)));

        let err = prior_anchor(&hypothesis("a>0,a>1"), 1e-10).unwrap_err();
        assert!(matches!(err, HypothesisError::InconsistentConstraints(_)));
    }

    #[test]
    fn test_redundant_rows_stay_consistent() {
        let anchor = prior_anchor(&hypothesis("a>0,a>0"), 1e-10).unwrap();
        assert_relative_eq!(anchor[0], 0.0, epsilon = 1e-10);
    }
}

//! The three Bayes-factor branches.
//!
//! Equality-only hypotheses use the Savage-Dickey density ratio of the
//! mapped constraint distributions. Inequality-only hypotheses divide the
//! posterior mass of the constrained region by its prior mass. Mixed
//! hypotheses multiply the equality ratio with inequality masses taken
//! conditional on the equalities holding.

use faer::Col;
use rand::Rng;

use crate::core::error::HypothesisError;
use crate::core::options::TestOptions;
use crate::distributions::{DistributionError, MultivariateT, SAMPLE_CHUNK};
use crate::engine::complement::InequalityRecord;
use crate::engine::prior::{prior_anchor, FractionalScales};
use crate::hypothesis::{ConstraintSet, Hypothesis};
use crate::utils::matrix::{block, invert_qr, null_space_basis, rank, vstack};

/// Outcome for one hypothesis: its Bayes factor against the unconstrained
/// model, plus the recorded inequality masses the complement needs later.
/// Only inequality-only hypotheses carry a record.
#[derive(Debug)]
pub(crate) struct Evaluation {
    pub bayes_factor: f64,
    pub record: Option<InequalityRecord>,
}

pub(crate) fn evaluate<R: Rng>(
    hypothesis: &Hypothesis,
    scales: &FractionalScales,
    options: &TestOptions,
    rng: &mut R,
) -> Result<Evaluation, HypothesisError> {
    let anchor = prior_anchor(hypothesis, options.rank_tolerance)?;
    let posterior = scales.posterior();
    let prior = scales.prior_at(&anchor)?;

    match (hypothesis.equalities(), hypothesis.inequalities()) {
        (Some(equalities), None) => {
            let bayes_factor = equality_factor(equalities, posterior, &prior)?;
            Ok(Evaluation {
                bayes_factor,
                record: None,
            })
        }
        (None, Some(inequalities)) => {
            let fit = constrained_mass(inequalities, posterior, options, rng)?;
            let complexity = constrained_mass(inequalities, &prior, options, rng)?;
            Ok(Evaluation {
                bayes_factor: fit / complexity,
                record: Some(InequalityRecord::new(
                    inequalities.clone(),
                    fit,
                    complexity,
                    prior,
                )),
            })
        }
        (Some(equalities), Some(inequalities)) => {
            let equality_part = equality_factor(equalities, posterior, &prior)?;
            let (conditional_set, posterior_c, prior_c) =
                condition_on_equalities(equalities, inequalities, posterior, &prior, options)?;
            let fit = constrained_mass(&conditional_set, &posterior_c, options, rng)?;
            let complexity = constrained_mass(&conditional_set, &prior_c, options, rng)?;
            // no record: these masses are conditional on the equality
            // subspace, while the complement works on unconditional ones
            Ok(Evaluation {
                bayes_factor: equality_part * fit / complexity,
                record: None,
            })
        }
        (None, None) => unreachable!("construction requires at least one comparison row"),
    }
}

/// Savage-Dickey ratio `f(r_e) / c(r_e)` of the mapped densities, computed
/// on the log scale and exponentiated once.
fn equality_factor(
    equalities: &ConstraintSet,
    posterior: &MultivariateT,
    prior: &MultivariateT,
) -> Result<f64, HypothesisError> {
    let singular = |e: DistributionError| match e {
        DistributionError::NotPositiveDefinite | DistributionError::SingularScale => {
            HypothesisError::SingularMatrix
        }
        other => HypothesisError::Distribution(other),
    };
    let mapped_posterior = posterior.linear_map(equalities.matrix())?;
    let mapped_prior = prior.linear_map(equalities.matrix())?;
    let log_fit = mapped_posterior
        .log_density(equalities.rhs())
        .map_err(singular)?;
    let log_complexity = mapped_prior.log_density(equalities.rhs()).map_err(singular)?;
    Ok((log_fit - log_complexity).exp())
}

/// `P(R β ≥ r)` under `dist`.
///
/// Full-row-rank sets go through the mapped low-dimensional distribution,
/// exactly for one row and by the separation-of-variables sampler otherwise.
/// Rank-deficient sets (redundant or opposing rows) fall back to counting
/// raw draws.
fn constrained_mass<R: Rng>(
    set: &ConstraintSet,
    dist: &MultivariateT,
    options: &TestOptions,
    rng: &mut R,
) -> Result<f64, HypothesisError> {
    if rank(set.matrix(), options.rank_tolerance) == set.rows() {
        let mapped = dist.linear_map(set.matrix())?;
        Ok(mapped.tail_probability(set.rhs(), options.monte_carlo_reps, rng)?)
    } else {
        monte_carlo_mass(set, dist, options.monte_carlo_reps, rng)
    }
}

fn monte_carlo_mass<R: Rng>(
    set: &ConstraintSet,
    dist: &MultivariateT,
    total: usize,
    rng: &mut R,
) -> Result<f64, HypothesisError> {
    let mut hits = 0usize;
    let mut remaining = total;
    while remaining > 0 {
        let len = SAMPLE_CHUNK.min(remaining);
        let draws = dist.sample(len, rng)?;
        for i in 0..len {
            if set.satisfied_by_row(&draws, i) {
                hits += 1;
            }
        }
        remaining -= len;
    }
    Ok(hits as f64 / total as f64)
}

/// Rewrites the inequality set into the coordinates left free by the
/// equality rows and conditions both distributions on those rows.
///
/// With `T = [R_e; N]` (N an orthonormal null-space basis of `R_e`) and
/// `B = R_i T⁻¹ = [A₁ | A₂]`, the constrained region becomes
/// `A₂ β̃ ≥ r_i - A₁ r_e` for the conditioned coordinates `β̃`.
fn condition_on_equalities(
    equalities: &ConstraintSet,
    inequalities: &ConstraintSet,
    posterior: &MultivariateT,
    prior: &MultivariateT,
    options: &TestOptions,
) -> Result<(ConstraintSet, MultivariateT, MultivariateT), HypothesisError> {
    let q = equalities.rows();
    let k = equalities.parameters();
    if rank(equalities.matrix(), options.rank_tolerance) < q {
        return Err(HypothesisError::SingularMatrix);
    }

    let null_basis = null_space_basis(equalities.matrix())
        .map_err(|message| HypothesisError::NumericalError(message.to_string()))?;
    let transform = vstack(equalities.matrix(), &null_basis);
    let transform_inv = invert_qr(&transform).map_err(|_| HypothesisError::SingularMatrix)?;

    let mapped = inequalities.matrix() * &transform_inv;
    let a1 = block(&mapped, 0, 0, inequalities.rows(), q);
    let a2 = block(&mapped, 0, q, inequalities.rows(), k - q);
    let shift = &a1 * equalities.rhs();
    let rhs = Col::from_fn(inequalities.rows(), |i| inequalities.rhs()[i] - shift[i]);
    let conditional_set = ConstraintSet::from_parts(a2, rhs);

    let posterior_c = posterior
        .linear_map(&transform)?
        .condition(q, equalities.rhs())?;
    let prior_c = prior.linear_map(&transform)?.condition(q, equalities.rhs())?;

    Ok((conditional_set, posterior_c, prior_c))
}

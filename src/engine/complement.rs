//! Complement hypothesis bookkeeping.
//!
//! Every inequality-only hypothesis leaves behind an [`InequalityRecord`].
//! Once all named hypotheses are evaluated, [`ComplementAccumulator::resolve`]
//! decides what "none of the above" means: nothing when the named regions
//! already tile the parameter space, the leftover mass ratio when they do
//! not, and a union-corrected ratio when the regions overlap.

use rand::Rng;

use crate::core::error::HypothesisError;
use crate::core::options::TestOptions;
use crate::distributions::{MultivariateT, SAMPLE_CHUNK};
use crate::engine::prior::FractionalScales;
use crate::hypothesis::ConstraintSet;

/// Inequality masses kept from one hypothesis evaluation.
#[derive(Debug)]
pub(crate) struct InequalityRecord {
    region: ConstraintSet,
    fit: f64,
    complexity: f64,
    prior: MultivariateT,
}

impl InequalityRecord {
    pub(crate) fn new(
        region: ConstraintSet,
        fit: f64,
        complexity: f64,
        prior: MultivariateT,
    ) -> Self {
        Self {
            region,
            fit,
            complexity,
            prior,
        }
    }
}

/// How the complement hypothesis enters the final comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComplementFactor {
    /// The named inequality regions cover the whole space, so the complement
    /// is empty and drops out of the comparison.
    Exhaustive,
    /// The complement keeps this Bayes factor against the unconstrained model.
    Include(f64),
}

impl ComplementFactor {
    /// Bayes factor contributed to the comparison. An exhaustive set of
    /// hypotheses leaves the complement at the neutral value one.
    pub fn bayes_factor(&self) -> f64 {
        match self {
            ComplementFactor::Exhaustive => 1.0,
            ComplementFactor::Include(value) => *value,
        }
    }

    pub fn is_included(&self) -> bool {
        matches!(self, ComplementFactor::Include(_))
    }
}

/// Collects inequality records during evaluation and turns them into the
/// complement's Bayes factor at the end.
pub(crate) struct ComplementAccumulator {
    records: Vec<InequalityRecord>,
}

impl ComplementAccumulator {
    pub(crate) fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, record: InequalityRecord) {
        self.records.push(record);
    }

    pub(crate) fn resolve<R: Rng>(
        &self,
        scales: &FractionalScales,
        options: &TestOptions,
        rng: &mut R,
    ) -> Result<ComplementFactor, HypothesisError> {
        match self.records.len() {
            0 => Ok(ComplementFactor::Include(1.0)),
            1 => {
                let record = &self.records[0];
                Ok(ComplementFactor::Include(
                    (1.0 - record.fit) / (1.0 - record.complexity),
                ))
            }
            _ => self.resolve_many(scales, options, rng),
        }
    }

    /// Classifies prior draws against every recorded region, then picks the
    /// disposition: exhaustive coverage, disjoint regions, or overlap.
    fn resolve_many<R: Rng>(
        &self,
        scales: &FractionalScales,
        options: &TestOptions,
        rng: &mut R,
    ) -> Result<ComplementFactor, HypothesisError> {
        let Some(reference) = self.records.last() else {
            return Ok(ComplementFactor::Include(1.0));
        };

        let total = options.monte_carlo_reps;
        let mut covered = 0usize;
        let mut multiple = 0usize;
        let mut remaining = total;
        while remaining > 0 {
            let len = SAMPLE_CHUNK.min(remaining);
            let draws = reference.prior.sample(len, rng)?;
            for i in 0..len {
                let hits = self
                    .records
                    .iter()
                    .filter(|record| record.region.satisfied_by_row(&draws, i))
                    .count();
                if hits > 0 {
                    covered += 1;
                }
                if hits > 1 {
                    multiple += 1;
                }
            }
            remaining -= len;
        }

        if covered == total {
            return Ok(ComplementFactor::Exhaustive);
        }
        if multiple == 0 {
            let fit_sum: f64 = self.records.iter().map(|record| record.fit).sum();
            let complexity_sum: f64 = self.records.iter().map(|record| record.complexity).sum();
            return Ok(ComplementFactor::Include(
                (1.0 - fit_sum) / (1.0 - complexity_sum),
            ));
        }

        let prior_union = covered as f64 / total as f64;
        let posterior_union = self.union_mass(scales.posterior(), total, rng)?;
        Ok(ComplementFactor::Include(
            (1.0 - posterior_union) / (1.0 - prior_union),
        ))
    }

    /// Share of draws from `dist` falling inside at least one recorded region.
    fn union_mass<R: Rng>(
        &self,
        dist: &MultivariateT,
        total: usize,
        rng: &mut R,
    ) -> Result<f64, HypothesisError> {
        let mut covered = 0usize;
        let mut remaining = total;
        while remaining > 0 {
            let len = SAMPLE_CHUNK.min(remaining);
            let draws = dist.sample(len, rng)?;
            for i in 0..len {
                if self
                    .records
                    .iter()
                    .any(|record| record.region.satisfied_by_row(&draws, i))
                {
                    covered += 1;
                }
            }
            remaining -= len;
        }
        Ok(covered as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LinearModelStats;
    use approx::assert_relative_eq;
    use faer::{Col, Mat};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn scales() -> FractionalScales {
        let names = vec!["a".to_string(), "b".to_string()];
        let coefficients = Col::from_fn(2, |i| [0.4, 0.1][i]);
        let covariance = Mat::from_fn(2, 2, |i, j| if i == j { 0.05 } else { 0.0 });
        let model = LinearModelStats::new(names, coefficients, covariance, 5.0, 30).unwrap();
        FractionalScales::new(&model, &TestOptions::default()).unwrap()
    }

    fn centered_prior() -> MultivariateT {
        let anchor = Col::zeros(2);
        scales().prior_at(&anchor).unwrap()
    }

    fn half_plane(sign: f64) -> ConstraintSet {
        let matrix = Mat::from_fn(1, 2, |_, j| if j == 0 { sign } else { 0.0 });
        ConstraintSet::from_parts(matrix, Col::zeros(1))
    }

    fn quadrant(sign_a: f64, sign_b: f64) -> ConstraintSet {
        let matrix = Mat::from_fn(2, 2, |i, j| match (i, j) {
            (0, 0) => sign_a,
            (1, 1) => sign_b,
            _ => 0.0,
        });
        ConstraintSet::from_parts(matrix, Col::zeros(2))
    }

    fn options(reps: usize) -> TestOptions {
        TestOptions {
            monte_carlo_reps: reps,
            ..TestOptions::default()
        }
    }

    #[test]
    fn test_no_records_keeps_neutral_factor() {
        let accumulator = ComplementAccumulator::new();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let factor = accumulator
            .resolve(&scales(), &options(1000), &mut rng)
            .unwrap();
        assert_eq!(factor, ComplementFactor::Include(1.0));
    }

    #[test]
    fn test_single_record_uses_leftover_masses() {
        let mut accumulator = ComplementAccumulator::new();
        accumulator.record(InequalityRecord::new(
            half_plane(1.0),
            0.9,
            0.5,
            centered_prior(),
        ));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let factor = accumulator
            .resolve(&scales(), &options(1000), &mut rng)
            .unwrap();
        match factor {
            ComplementFactor::Include(value) => {
                assert_relative_eq!(value, 0.1 / 0.5, epsilon = 1e-12)
            }
            ComplementFactor::Exhaustive => panic!("single record never exhausts the space"),
        }
    }

    #[test]
    fn test_opposing_half_planes_are_exhaustive() {
        let mut accumulator = ComplementAccumulator::new();
        accumulator.record(InequalityRecord::new(
            half_plane(1.0),
            0.8,
            0.5,
            centered_prior(),
        ));
        accumulator.record(InequalityRecord::new(
            half_plane(-1.0),
            0.2,
            0.5,
            centered_prior(),
        ));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let factor = accumulator
            .resolve(&scales(), &options(20_000), &mut rng)
            .unwrap();
        assert_eq!(factor, ComplementFactor::Exhaustive);
        assert_relative_eq!(factor.bayes_factor(), 1.0);
        assert!(!factor.is_included());
    }

    #[test]
    fn test_disjoint_quadrants_sum_their_masses() {
        let mut accumulator = ComplementAccumulator::new();
        accumulator.record(InequalityRecord::new(
            quadrant(1.0, 1.0),
            0.6,
            0.25,
            centered_prior(),
        ));
        accumulator.record(InequalityRecord::new(
            quadrant(-1.0, -1.0),
            0.1,
            0.25,
            centered_prior(),
        ));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let factor = accumulator
            .resolve(&scales(), &options(20_000), &mut rng)
            .unwrap();
        match factor {
            ComplementFactor::Include(value) => {
                assert_relative_eq!(value, 0.3 / 0.5, epsilon = 1e-12)
            }
            ComplementFactor::Exhaustive => panic!("quadrants leave half the space uncovered"),
        }
    }

    #[test]
    fn test_overlapping_regions_fall_back_to_union_masses() {
        // two copies of the same half plane overlap on every draw
        let mut accumulator = ComplementAccumulator::new();
        accumulator.record(InequalityRecord::new(
            half_plane(1.0),
            0.8,
            0.5,
            centered_prior(),
        ));
        accumulator.record(InequalityRecord::new(
            half_plane(1.0),
            0.8,
            0.5,
            centered_prior(),
        ));
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let factor = accumulator
            .resolve(&scales(), &options(200_000), &mut rng)
            .unwrap();
        // union of the two is the single half plane with prior mass one half,
        // posterior mass P(a > 0) with a centered at 0.4 and sd sqrt(0.05)
        match factor {
            ComplementFactor::Include(value) => {
                assert!(value > 0.0 && value < 1.0);
                assert_relative_eq!(value, (1.0 - 0.955) / 0.5, epsilon = 0.05);
            }
            ComplementFactor::Exhaustive => panic!("a half plane cannot exhaust the space"),
        }
    }
}

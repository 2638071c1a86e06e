//! Informed-hypothesis test pipeline.
//!
//! [`InformedTest`] ties the pieces together: parse the hypothesis string,
//! build the fractional prior and posterior scales from the fitted model,
//! evaluate each hypothesis into a Bayes factor, and fold the leftover
//! parameter space into the complement.

mod bayes_factor;
mod complement;
mod prior;

pub use complement::ComplementFactor;

use faer::Mat;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::core::error::HypothesisError;
use crate::core::model::LinearModelStats;
use crate::core::options::TestOptions;
use crate::core::result::InformedTestResult;
use crate::engine::bayes_factor::evaluate;
use crate::engine::complement::ComplementAccumulator;
use crate::engine::prior::FractionalScales;
use crate::hypothesis::{parse, Hypothesis, SymbolTable};

/// Bayesian evaluation of informed hypotheses on fitted regression
/// coefficients.
///
/// ```
/// use faer::{Col, Mat};
/// use hypotest::{InformedTest, LinearModelStats};
///
/// let names = vec!["weight".to_string(), "height".to_string()];
/// let coefficients = Col::from_fn(2, |i| [0.8, 0.3][i]);
/// let covariance = Mat::from_fn(2, 2, |i, j| if i == j { 0.02 } else { 0.004 });
/// let model = LinearModelStats::new(names, coefficients, covariance, 12.5, 120)?;
///
/// let test = InformedTest::builder().seed(7).build();
/// let result = test.test(&model, "weight > height; weight = height")?;
/// assert_eq!(result.labels(), &["H1", "H2", "Hc"]);
/// # Ok::<(), hypotest::HypothesisError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct InformedTest {
    options: TestOptions,
}

impl InformedTest {
    pub fn new(options: TestOptions) -> Self {
        Self { options }
    }

    pub fn builder() -> InformedTestBuilder {
        InformedTestBuilder::default()
    }

    pub fn options(&self) -> &TestOptions {
        &self.options
    }

    /// Evaluates every `;`-separated hypothesis in `hypotheses` against the
    /// fitted model and returns posterior probabilities and the pairwise
    /// Bayes-factor matrix.
    pub fn test(
        &self,
        model: &LinearModelStats,
        hypotheses: &str,
    ) -> Result<InformedTestResult, HypothesisError> {
        self.options.validate()?;

        let symbols = SymbolTable::new(model.parameter_names())?;
        let scales = FractionalScales::new(model, &self.options)?;
        let parsed = parse(hypotheses, &symbols)?;
        let named: Vec<Hypothesis> = parsed
            .iter()
            .map(|p| Hypothesis::from_parsed(p, model.n_parameters()))
            .collect::<Result<_, _>>()?;

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.options.effective_seed());
        let mut factors = Vec::with_capacity(named.len());
        let mut accumulator = ComplementAccumulator::new();
        for hypothesis in &named {
            let evaluation = evaluate(hypothesis, &scales, &self.options, &mut rng)?;
            factors.push(evaluation.bayes_factor);
            if let Some(record) = evaluation.record {
                accumulator.record(record);
            }
        }
        let complement = accumulator.resolve(&scales, &self.options, &mut rng)?;

        Ok(assemble(named, factors, complement))
    }
}

fn assemble(
    hypotheses: Vec<Hypothesis>,
    factors: Vec<f64>,
    complement: ComplementFactor,
) -> InformedTestResult {
    let mut labels: Vec<String> = (1..=factors.len()).map(|i| format!("H{i}")).collect();
    let mut all = factors;
    if complement.is_included() {
        labels.push("Hc".to_string());
        all.push(complement.bayes_factor());
    }

    let total: f64 = all.iter().sum();
    let probabilities: Vec<f64> = all.iter().map(|bf| bf / total).collect();
    let matrix = Mat::from_fn(all.len(), all.len(), |i, j| all[j] / all[i]);
    let texts = hypotheses.into_iter().map(|h| h.text().to_string()).collect();

    InformedTestResult::new(labels, texts, all, probabilities, matrix, complement)
}

/// Builds an [`InformedTest`] with selected options overridden.
#[derive(Debug, Clone, Default)]
pub struct InformedTestBuilder {
    options: TestOptions,
}

impl InformedTestBuilder {
    /// Number of Monte Carlo draws used by the sampling fallbacks.
    pub fn monte_carlo_reps(mut self, reps: usize) -> Self {
        self.options.monte_carlo_reps = reps;
        self
    }

    /// Fixes the random stream so repeated runs return identical numbers.
    pub fn seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self
    }

    /// Multiplier on the minimal training fraction `(k + 1) / n`.
    pub fn fraction(mut self, fraction: f64) -> Self {
        self.options.fraction = fraction;
        self
    }

    /// Threshold below which pivots count as zero in rank decisions.
    pub fn rank_tolerance(mut self, tolerance: f64) -> Self {
        self.options.rank_tolerance = tolerance;
        self
    }

    pub fn build(self) -> InformedTest {
        InformedTest {
            options: self.options,
        }
    }
}

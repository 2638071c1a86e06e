//! Informed-hypothesis test results.

use faer::Mat;

use crate::engine::ComplementFactor;

/// Complete result of an informed-hypothesis test.
///
/// Holds one entry per named hypothesis, in input order, plus a final
/// complement entry labelled `Hc` whenever the named hypotheses leave part
/// of the parameter space uncovered.
#[derive(Debug, Clone)]
pub struct InformedTestResult {
    labels: Vec<String>,
    hypothesis_texts: Vec<String>,
    bayes_factors: Vec<f64>,
    posterior_probabilities: Vec<f64>,
    bayes_factor_matrix: Mat<f64>,
    complement: ComplementFactor,
}

impl InformedTestResult {
    pub(crate) fn new(
        labels: Vec<String>,
        hypothesis_texts: Vec<String>,
        bayes_factors: Vec<f64>,
        posterior_probabilities: Vec<f64>,
        bayes_factor_matrix: Mat<f64>,
        complement: ComplementFactor,
    ) -> Self {
        Self {
            labels,
            hypothesis_texts,
            bayes_factors,
            posterior_probabilities,
            bayes_factor_matrix,
            complement,
        }
    }

    /// Labels in matrix order: `H1`, `H2`, ... and, when present, `Hc`.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Cleaned text of each named hypothesis, in input order.
    pub fn hypothesis_texts(&self) -> &[String] {
        &self.hypothesis_texts
    }

    /// Bayes factor of each entry against the unconstrained model.
    pub fn bayes_factors(&self) -> &[f64] {
        &self.bayes_factors
    }

    /// Posterior probabilities under equal prior weights. They sum to one.
    pub fn posterior_probabilities(&self) -> &[f64] {
        &self.posterior_probabilities
    }

    /// Pairwise evidence matrix. Entry `(i, j)` is the Bayes factor of
    /// entry `j` against entry `i`, so each column reads as evidence in
    /// favour of that column's hypothesis.
    pub fn bayes_factor_matrix(&self) -> &Mat<f64> {
        &self.bayes_factor_matrix
    }

    /// Bayes factor of a single entry, by label.
    pub fn bayes_factor(&self, label: &str) -> Option<f64> {
        let index = self.labels.iter().position(|l| l == label)?;
        Some(self.bayes_factors[index])
    }

    /// Posterior probability of a single entry, by label.
    pub fn posterior_probability(&self, label: &str) -> Option<f64> {
        let index = self.labels.iter().position(|l| l == label)?;
        Some(self.posterior_probabilities[index])
    }

    /// Bayes factor of `numerator` against `denominator`, by label.
    pub fn comparison(&self, numerator: &str, denominator: &str) -> Option<f64> {
        let num = self.labels.iter().position(|l| l == numerator)?;
        let den = self.labels.iter().position(|l| l == denominator)?;
        Some(self.bayes_factor_matrix[(den, num)])
    }

    /// Whether a complement entry takes part in the comparison.
    pub fn has_complement(&self) -> bool {
        self.complement.is_included()
    }

    /// Disposition of the complement hypothesis.
    pub fn complement(&self) -> ComplementFactor {
        self.complement
    }

    /// Number of entries in the comparison, complement included.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> InformedTestResult {
        let factors = vec![4.0, 1.0, 0.5];
        let matrix = Mat::from_fn(3, 3, |i, j| factors[j] / factors[i]);
        InformedTestResult::new(
            vec!["H1".to_string(), "H2".to_string(), "Hc".to_string()],
            vec!["a>b".to_string(), "a=b".to_string()],
            factors.clone(),
            factors.iter().map(|bf| bf / 5.5).collect(),
            matrix,
            ComplementFactor::Include(0.5),
        )
    }

    #[test]
    fn test_comparison_reads_the_matrix_by_label() {
        let result = sample();
        assert_relative_eq!(result.comparison("H1", "H2").unwrap(), 4.0);
        assert_relative_eq!(result.comparison("H2", "H1").unwrap(), 0.25);
        assert_relative_eq!(result.comparison("H1", "Hc").unwrap(), 8.0);
        assert!(result.comparison("H9", "H1").is_none());
    }

    #[test]
    fn test_label_lookups_match_vector_entries() {
        let result = sample();
        assert_relative_eq!(result.bayes_factor("H1").unwrap(), 4.0);
        assert_relative_eq!(result.bayes_factor("Hc").unwrap(), 0.5);
        assert_relative_eq!(result.posterior_probability("H2").unwrap(), 1.0 / 5.5);
        assert!(result.bayes_factor("H7").is_none());
        assert!(result.posterior_probability("").is_none());
    }

    #[test]
    fn test_complement_accessors() {
        let result = sample();
        assert!(result.has_complement());
        assert_eq!(result.complement(), ComplementFactor::Include(0.5));
        assert_eq!(result.len(), 3);
        assert!(!result.is_empty());
    }

    #[test]
    fn test_texts_track_named_hypotheses_only() {
        let result = sample();
        assert_eq!(result.hypothesis_texts().len(), 2);
        assert_eq!(result.labels().len(), 3);
    }
}

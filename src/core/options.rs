//! Test options and configuration.

use thiserror::Error;

/// Default number of Monte Carlo draws for the sampling fallbacks.
pub const DEFAULT_MONTE_CARLO_REPS: usize = 1_000_000;

/// Seed used when no explicit seed is configured.
pub const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Configuration options for an informed-hypothesis test.
#[derive(Debug, Clone)]
pub struct TestOptions {
    /// Number of Monte Carlo draws for sampling-based probabilities
    /// (default: 1,000,000).
    pub monte_carlo_reps: usize,
    /// Seed for the random stream. `None` uses a fixed built-in seed, so
    /// results are reproducible either way (default: None).
    pub seed: Option<u64>,
    /// Multiplier on the minimal training fraction `(k + 1) / n` used to
    /// build the fractional prior (default: 1.0).
    pub fraction: f64,
    /// Rank tolerance for QR and reduced-row-echelon pivot decisions.
    pub rank_tolerance: f64,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            monte_carlo_reps: DEFAULT_MONTE_CARLO_REPS,
            seed: None,
            fraction: 1.0,
            rank_tolerance: 1e-10,
        }
    }
}

/// Errors that can occur when validating test options.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("monte_carlo_reps must be at least 1")]
    ZeroMonteCarloReps,
    #[error("fraction must be at least 1, got {0}")]
    InvalidFraction(f64),
    #[error("rank_tolerance must be positive, got {0}")]
    InvalidRankTolerance(f64),
}

impl TestOptions {
    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.monte_carlo_reps < 1 {
            return Err(OptionsError::ZeroMonteCarloReps);
        }
        if !self.fraction.is_finite() || self.fraction < 1.0 {
            return Err(OptionsError::InvalidFraction(self.fraction));
        }
        if !self.rank_tolerance.is_finite() || self.rank_tolerance <= 0.0 {
            return Err(OptionsError::InvalidRankTolerance(self.rank_tolerance));
        }
        Ok(())
    }

    /// Seed actually fed to the random stream.
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }
}

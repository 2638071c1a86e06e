//! Common test utilities and synthetic model generators.

use faer::{Col, Mat};
use hypotest::utils::matrix::invert_qr;
use hypotest::LinearModelStats;

/// Simple deterministic generator for reproducible test data.
pub struct Lcg(pub u64);

impl Lcg {
    pub fn next_uniform(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    pub fn next_gaussian(&mut self) -> f64 {
        let u1 = self.next_uniform().max(f64::MIN_POSITIVE);
        let u2 = self.next_uniform();
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

/// Solves the normal equations for `x` and `y` and packages the fit as
/// reported summary statistics.
pub fn fit_stats(names: &[&str], x: &Mat<f64>, y: &Col<f64>) -> LinearModelStats {
    let n = x.nrows();
    let k = x.ncols();

    let xtx = x.transpose() * x;
    let xty = x.transpose() * y;
    let xtx_inv = invert_qr(&xtx).unwrap();
    let beta = &xtx_inv * &xty;

    let mut rss = 0.0;
    for i in 0..n {
        let mut fitted = 0.0;
        for j in 0..k {
            fitted += x[(i, j)] * beta[j];
        }
        rss += (y[i] - fitted) * (y[i] - fitted);
    }

    let names = names.iter().map(|s| s.to_string()).collect();
    LinearModelStats::from_xtx_inverse(names, beta, xtx_inv, rss, n).unwrap()
}

/// Generates `n` observations of `y = x * beta + noise` with standard
/// normal predictors, then fits and summarizes the model.
pub fn synthetic_model(
    names: &[&str],
    true_coefficients: &[f64],
    noise_std: f64,
    n: usize,
    seed: u64,
) -> LinearModelStats {
    let k = true_coefficients.len();
    let mut rng = Lcg(seed);

    let mut x = Mat::zeros(n, k);
    let mut y = Col::zeros(n);
    for i in 0..n {
        let mut yi = 0.0;
        for j in 0..k {
            x[(i, j)] = rng.next_gaussian();
            yi += x[(i, j)] * true_coefficients[j];
        }
        y[i] = yi + noise_std * rng.next_gaussian();
    }

    fit_stats(names, &x, &y)
}

/// Approximate equality check for floating point values.
#[allow(dead_code)]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

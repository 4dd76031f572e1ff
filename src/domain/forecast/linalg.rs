//! Penalized least squares via normal equations and Cholesky.

use crate::domain::error::FitError;

/// Pivots below this fraction of the unfactored diagonal are treated as rank loss.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Accumulates `XᵀX + diag(λ)` and `Xᵀy` one observation at a time.
#[derive(Debug, Clone)]
pub struct NormalEquations {
    dim: usize,
    gram: Vec<f64>,
    rhs: Vec<f64>,
}

impl NormalEquations {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            gram: vec![0.0; dim * dim],
            rhs: vec![0.0; dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn add_observation(&mut self, row: &[f64], y: f64) {
        debug_assert_eq!(row.len(), self.dim);
        for i in 0..self.dim {
            let xi = row[i];
            if xi == 0.0 {
                continue;
            }
            self.rhs[i] += xi * y;
            // lower triangle only; mirrored in solve
            for j in 0..=i {
                self.gram[i * self.dim + j] += xi * row[j];
            }
        }
    }

    /// Adds a Gaussian prior with standard deviation `scale` on coefficient `i`.
    pub fn add_prior(&mut self, i: usize, scale: f64) {
        self.gram[i * self.dim + i] += 1.0 / (scale * scale);
    }

    pub fn solve(mut self) -> Result<Vec<f64>, FitError> {
        let n = self.dim;
        for i in 0..n {
            for j in 0..i {
                self.gram[j * n + i] = self.gram[i * n + j];
            }
        }
        let lower = cholesky(&self.gram, n)?;
        let z = forward_substitute(&lower, &self.rhs, n);
        let beta = back_substitute_transposed(&lower, &z, n);
        if beta.iter().any(|b| !b.is_finite()) {
            return Err(FitError::Singular { pivot: n });
        }
        Ok(beta)
    }
}

/// Returns L with A = L Lᵀ, row-major, upper triangle zero.
fn cholesky(a: &[f64], n: usize) -> Result<Vec<f64>, FitError> {
    let mut l = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i * n + j];
            for k in 0..j {
                sum -= l[i * n + k] * l[j * n + k];
            }
            if i == j {
                if !sum.is_finite() || sum <= PIVOT_TOLERANCE * a[i * n + i].abs() {
                    return Err(FitError::Singular { pivot: i });
                }
                l[i * n + i] = sum.sqrt();
            } else {
                l[i * n + j] = sum / l[j * n + j];
            }
        }
    }
    Ok(l)
}

fn forward_substitute(l: &[f64], b: &[f64], n: usize) -> Vec<f64> {
    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[i * n + k] * z[k];
        }
        z[i] = sum / l[i * n + i];
    }
    z
}

fn back_substitute_transposed(l: &[f64], z: &[f64], n: usize) -> Vec<f64> {
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in (i + 1)..n {
            sum -= l[k * n + i] * x[k];
        }
        x[i] = sum / l[i * n + i];
    }
    x
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

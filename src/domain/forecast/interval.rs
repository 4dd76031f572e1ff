//! Uncertainty band around the point forecast.
//!
//! Two sources are combined in scaled units: observation noise estimated from
//! the historical residuals, and future trend drift. Drift models rate changes
//! arriving at the historical changepoint frequency with Laplace-distributed
//! magnitudes, whose variance at horizon h has the closed form ρ·2b²·h³/3.

use statrs::distribution::{ContinuousCDF, Normal};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalModel {
    z: f64,
    noise_var: f64,
    /// Changepoints per unit of scaled history.
    changepoint_rate: f64,
    /// Mean absolute fitted rate change.
    mean_abs_delta: f64,
}

impl IntervalModel {
    pub fn new(interval_width: f64, residuals: &[f64], deltas: &[f64], history_span: f64) -> Self {
        let noise_var = if residuals.is_empty() {
            0.0
        } else {
            residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64
        };
        let mean_abs_delta = if deltas.is_empty() {
            0.0
        } else {
            deltas.iter().map(|d| d.abs()).sum::<f64>() / deltas.len() as f64
        };
        let changepoint_rate = if history_span > 0.0 {
            deltas.len() as f64 / history_span
        } else {
            0.0
        };
        Self {
            z: z_score(interval_width),
            noise_var,
            changepoint_rate,
            mean_abs_delta,
        }
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn noise_sd(&self) -> f64 {
        self.noise_var.sqrt()
    }

    /// Variance of the trend at scaled distance `h` past the end of history.
    pub fn trend_variance(&self, h: f64) -> f64 {
        if h <= 0.0 {
            return 0.0;
        }
        let b = self.mean_abs_delta;
        self.changepoint_rate * 2.0 * b * b * h.powi(3) / 3.0
    }

    /// Half-width of the band in scaled units.
    pub fn half_width(&self, h: f64) -> f64 {
        self.z * (self.noise_var + self.trend_variance(h)).sqrt()
    }
}

/// Two-sided standard-normal quantile for a central interval of the given width.
pub fn z_score(interval_width: f64) -> f64 {
    let p = 0.5 + interval_width / 2.0;
    Normal::new(0.0, 1.0)
        .map(|n| n.inverse_cdf(p))
        .unwrap_or(f64::NAN)
}

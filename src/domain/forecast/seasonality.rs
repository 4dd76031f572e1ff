//! Fourier-basis seasonal regressors.

use std::f64::consts::PI;

pub const DAILY_PERIOD: f64 = 1.0;
pub const WEEKLY_PERIOD: f64 = 7.0;
pub const YEARLY_PERIOD: f64 = 365.25;

const DAILY_ORDER: usize = 4;
const WEEKLY_ORDER: usize = 3;
const YEARLY_ORDER: usize = 10;

/// A periodic component expanded into `order` sine/cosine pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seasonality {
    pub name: &'static str,
    /// Period in days.
    pub period: f64,
    pub order: usize,
}

impl Seasonality {
    pub fn daily() -> Self {
        Self {
            name: "daily",
            period: DAILY_PERIOD,
            order: DAILY_ORDER,
        }
    }

    pub fn weekly() -> Self {
        Self {
            name: "weekly",
            period: WEEKLY_PERIOD,
            order: WEEKLY_ORDER,
        }
    }

    pub fn yearly() -> Self {
        Self {
            name: "yearly",
            period: YEARLY_PERIOD,
            order: YEARLY_ORDER,
        }
    }

    /// Number of regressor columns this component contributes.
    pub fn width(&self) -> usize {
        2 * self.order
    }

    /// Appends `[sin(2πkd/P), cos(2πkd/P)]` for k = 1..=order, `day` counted from the series start.
    pub fn extend_row(&self, day: f64, row: &mut Vec<f64>) {
        for k in 1..=self.order {
            let angle = 2.0 * PI * k as f64 * day / self.period;
            row.push(angle.sin());
            row.push(angle.cos());
        }
    }
}

/// Components enabled by the given flags, in a fixed column order.
pub fn enabled(yearly: bool, weekly: bool, daily: bool) -> Vec<Seasonality> {
    let mut out = Vec::with_capacity(3);
    if yearly {
        out.push(Seasonality::yearly());
    }
    if weekly {
        out.push(Seasonality::weekly());
    }
    if daily {
        out.push(Seasonality::daily());
    }
    out
}

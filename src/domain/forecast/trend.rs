//! Piecewise-linear trend with changepoints.
//!
//! trend(t) = m + k*t + Σ δ_j * max(0, t - s_j), with t scaled so history spans [0, 1].

/// Picks changepoint locations among the historical time stamps.
///
/// Candidates are spread evenly by index over the first `range` fraction of
/// history; the first point is never a changepoint.
pub fn changepoints(t: &[f64], requested: usize, range: f64) -> Vec<f64> {
    let hist_size = (t.len() as f64 * range).floor() as usize;
    if hist_size < 2 {
        return Vec::new();
    }
    let count = requested.min(hist_size - 1);
    if count == 0 {
        return Vec::new();
    }

    let step = (hist_size - 1) as f64 / count as f64;
    (1..=count)
        .map(|i| t[(i as f64 * step).round() as usize])
        .collect()
}

/// Hinge regressor for a changepoint at `s`.
pub fn hinge(t: f64, s: f64) -> f64 {
    (t - s).max(0.0)
}

/// Appends `[1, t, hinge(t, s_1), ..]` to `row`.
pub fn extend_row(t: f64, changepoints: &[f64], row: &mut Vec<f64>) {
    row.push(1.0);
    row.push(t);
    row.extend(changepoints.iter().map(|&s| hinge(t, s)));
}

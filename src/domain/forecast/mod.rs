//! Trend + seasonality forecasting of the aggregated savings series.
//!
//! The model is additive: a piecewise-linear changepoint trend plus Fourier
//! seasonal terms, fit jointly by penalized least squares on the scaled
//! series. Every coefficient carries a Gaussian prior; the changepoint prior
//! scale is the trend flexibility knob (larger admits sharper bends).

pub mod interval;
pub mod linalg;
pub mod seasonality;
pub mod trend;

use crate::domain::aggregate::AggregatedPoint;
use crate::domain::error::FitError;
use chrono::{Days, NaiveDate};
use interval::IntervalModel;
use linalg::{NormalEquations, dot};
use seasonality::Seasonality;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_HORIZON_DAYS: u32 = 360;
pub const DEFAULT_CHANGEPOINT_PRIOR_SCALE: f64 = 0.2;
pub const DEFAULT_INTERVAL_WIDTH: f64 = 0.95;
pub const DEFAULT_N_CHANGEPOINTS: usize = 25;
pub const DEFAULT_CHANGEPOINT_RANGE: f64 = 0.8;
pub const DEFAULT_SEASONALITY_PRIOR_SCALE: f64 = 10.0;

/// Minimum number of distinct dates needed to estimate a trend.
pub const MIN_HISTORY_POINTS: usize = 2;

/// Prior scale on the base offset and growth rate.
const TREND_PRIOR_SCALE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Trend flexibility.
    pub changepoint_prior_scale: f64,
    pub n_changepoints: usize,
    /// Fraction of history in which changepoints may be placed.
    pub changepoint_range: f64,
    pub seasonality_prior_scale: f64,
    pub yearly_seasonality: bool,
    pub weekly_seasonality: bool,
    pub daily_seasonality: bool,
    pub interval_width: f64,
    pub horizon_days: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            changepoint_prior_scale: DEFAULT_CHANGEPOINT_PRIOR_SCALE,
            n_changepoints: DEFAULT_N_CHANGEPOINTS,
            changepoint_range: DEFAULT_CHANGEPOINT_RANGE,
            seasonality_prior_scale: DEFAULT_SEASONALITY_PRIOR_SCALE,
            yearly_seasonality: false,
            weekly_seasonality: true,
            daily_seasonality: true,
            interval_width: DEFAULT_INTERVAL_WIDTH,
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

/// Projected value for one date; `lower_bound <= point_estimate <= upper_bound`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone)]
pub struct ForecastModel {
    config: ForecastConfig,
}

impl Default for ForecastModel {
    fn default() -> Self {
        Self::new(ForecastConfig::default())
    }
}

impl ForecastModel {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Fits the model. `Ok(None)` when the series has fewer than two distinct dates.
    ///
    /// `series` must be in the shape produced by
    /// [`aggregate`](crate::domain::aggregate::aggregate): unique, ascending dates.
    /// Anything else is rejected with [`FitError::UnorderedSeries`].
    pub fn fit(&self, series: &[AggregatedPoint]) -> Result<Option<FittedModel>, FitError> {
        if let Some(i) = series.windows(2).position(|w| w[0].date >= w[1].date) {
            return Err(FitError::UnorderedSeries { position: i + 1 });
        }

        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            return Ok(None);
        };
        if series.len() < MIN_HISTORY_POINTS {
            return Ok(None);
        }
        if let Some(bad) = series.iter().find(|p| !p.total_amount.is_finite()) {
            return Err(FitError::NonFiniteInput { date: bad.date });
        }

        let origin = first.date;
        let span_days = (last.date - origin).num_days() as f64;
        let y_scale = match series.iter().map(|p| p.total_amount.abs()).fold(0.0, f64::max) {
            m if m > 0.0 => m,
            _ => 1.0,
        };

        let days: Vec<f64> = series
            .iter()
            .map(|p| (p.date - origin).num_days() as f64)
            .collect();
        let t: Vec<f64> = days.iter().map(|d| d / span_days).collect();

        let design = Design {
            changepoints: trend::changepoints(
                &t,
                self.config.n_changepoints,
                self.config.changepoint_range,
            ),
            seasonalities: seasonality::enabled(
                self.config.yearly_seasonality,
                self.config.weekly_seasonality,
                self.config.daily_seasonality,
            ),
        };

        let rows: Vec<Vec<f64>> = t
            .iter()
            .zip(&days)
            .map(|(&ti, &di)| design.row(ti, di))
            .collect();
        let y: Vec<f64> = series.iter().map(|p| p.total_amount / y_scale).collect();

        let mut equations = NormalEquations::new(design.width());
        for (row, &yi) in rows.iter().zip(&y) {
            equations.add_observation(row, yi);
        }
        for (i, scale) in design.prior_scales(&self.config).into_iter().enumerate() {
            equations.add_prior(i, scale);
        }
        let beta = equations.solve()?;

        let residuals: Vec<f64> = rows
            .iter()
            .zip(&y)
            .map(|(row, &yi)| yi - dot(row, &beta))
            .collect();
        let deltas = &beta[2..design.trend_width()];
        // history spans exactly one unit of scaled time
        let interval = IntervalModel::new(self.config.interval_width, &residuals, deltas, 1.0);

        debug!(
            points = series.len(),
            changepoints = design.changepoints.len(),
            regressors = design.width(),
            noise_sd = interval.noise_sd() * y_scale,
            "forecast model fitted"
        );

        Ok(Some(FittedModel {
            origin,
            last_date: last.date,
            span_days,
            y_scale,
            history: series.iter().map(|p| p.date).collect(),
            design,
            beta,
            interval,
        }))
    }

    /// Fits and projects `config.horizon_days` days past the last historical date.
    ///
    /// Empty and single-date series yield an empty forecast.
    pub fn fit_and_project(
        &self,
        series: &[AggregatedPoint],
    ) -> Result<Vec<ForecastPoint>, FitError> {
        match self.fit(series)? {
            Some(fitted) => fitted.project(self.config.horizon_days),
            None => Ok(Vec::new()),
        }
    }
}

/// Fits with the default configuration and the given horizon.
pub fn fit_and_project(
    series: &[AggregatedPoint],
    horizon_days: u32,
) -> Result<Vec<ForecastPoint>, FitError> {
    ForecastModel::new(ForecastConfig {
        horizon_days,
        ..ForecastConfig::default()
    })
    .fit_and_project(series)
}

/// Regressor layout: `[offset, rate, δ_1..δ_c, seasonal terms..]`.
#[derive(Debug, Clone)]
struct Design {
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
}

impl Design {
    fn trend_width(&self) -> usize {
        2 + self.changepoints.len()
    }

    fn width(&self) -> usize {
        self.trend_width() + self.seasonalities.iter().map(Seasonality::width).sum::<usize>()
    }

    fn row(&self, t: f64, day: f64) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.width());
        trend::extend_row(t, &self.changepoints, &mut row);
        for s in &self.seasonalities {
            s.extend_row(day, &mut row);
        }
        row
    }

    fn prior_scales(&self, config: &ForecastConfig) -> Vec<f64> {
        let mut scales = vec![TREND_PRIOR_SCALE, TREND_PRIOR_SCALE];
        scales.extend(std::iter::repeat_n(
            config.changepoint_prior_scale,
            self.changepoints.len(),
        ));
        scales.resize(self.width(), config.seasonality_prior_scale);
        scales
    }
}

/// A fitted trend + seasonality model, ready to project.
#[derive(Debug, Clone)]
pub struct FittedModel {
    origin: NaiveDate,
    last_date: NaiveDate,
    span_days: f64,
    y_scale: f64,
    history: Vec<NaiveDate>,
    design: Design,
    beta: Vec<f64>,
    interval: IntervalModel,
}

impl FittedModel {
    pub fn interval(&self) -> &IntervalModel {
        &self.interval
    }

    pub fn last_history_date(&self) -> NaiveDate {
        self.last_date
    }

    /// Fitted rate changes at each changepoint, in scaled units.
    pub fn deltas(&self) -> &[f64] {
        &self.beta[2..self.design.trend_width()]
    }

    fn scaled_time(&self, date: NaiveDate) -> (f64, f64) {
        let day = (date - self.origin).num_days() as f64;
        (day / self.span_days, day)
    }

    /// Trend component at `date`, in currency units.
    pub fn trend_at(&self, date: NaiveDate) -> f64 {
        let (t, day) = self.scaled_time(date);
        let row = self.design.row(t, day);
        let k = self.design.trend_width();
        dot(&row[..k], &self.beta[..k]) * self.y_scale
    }

    /// Combined seasonal component at `date`, in currency units.
    pub fn seasonal_at(&self, date: NaiveDate) -> f64 {
        let (t, day) = self.scaled_time(date);
        let row = self.design.row(t, day);
        let k = self.design.trend_width();
        dot(&row[k..], &self.beta[k..]) * self.y_scale
    }

    pub fn predict(&self, date: NaiveDate) -> Result<ForecastPoint, FitError> {
        let (t, day) = self.scaled_time(date);
        let estimate = dot(&self.design.row(t, day), &self.beta) * self.y_scale;
        let half = self.interval.half_width(t - 1.0) * self.y_scale;
        if !estimate.is_finite() || !half.is_finite() {
            return Err(FitError::NonFiniteOutput { date });
        }
        Ok(ForecastPoint {
            date,
            point_estimate: estimate,
            lower_bound: estimate - half,
            upper_bound: estimate + half,
        })
    }

    /// Every historical date, then one point per day for `horizon_days` days.
    ///
    /// Fails with [`FitError::HorizonOutOfRange`] when the horizon runs past
    /// the last representable calendar date.
    pub fn project(&self, horizon_days: u32) -> Result<Vec<ForecastPoint>, FitError> {
        let out_of_range = FitError::HorizonOutOfRange {
            last: self.last_date,
            horizon_days,
        };
        if self
            .last_date
            .checked_add_days(Days::new(u64::from(horizon_days)))
            .is_none()
        {
            return Err(out_of_range);
        }

        let future = (1..=u64::from(horizon_days)).map(|i| {
            self.last_date
                .checked_add_days(Days::new(i))
                .ok_or_else(|| out_of_range.clone())
        });
        self.history
            .iter()
            .copied()
            .map(Ok)
            .chain(future)
            .map(|date| self.predict(date?))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn point(d: NaiveDate, total_amount: f64) -> AggregatedPoint {
        AggregatedPoint {
            date: d,
            total_amount,
        }
    }

    fn daily_series(start: NaiveDate, values: &[f64]) -> Vec<AggregatedPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| point(start + Duration::days(i as i64), v))
            .collect()
    }

    #[test]
    fn empty_series_projects_nothing() {
        assert!(fit_and_project(&[], 360).unwrap().is_empty());
    }

    #[test]
    fn single_point_projects_nothing() {
        let series = [point(date(2025, 1, 1), 50.0)];
        assert!(fit_and_project(&series, 360).unwrap().is_empty());
    }

    #[test]
    fn two_points_cover_history_and_horizon() {
        let series = [point(date(2025, 1, 1), 100.0), point(date(2025, 1, 2), 100.0)];
        let forecast = fit_and_project(&series, 360).unwrap();

        assert_eq!(forecast.len(), 2 + 360);
        assert_eq!(forecast[0].date, date(2025, 1, 1));
        assert_eq!(forecast[1].date, date(2025, 1, 2));
        assert_eq!(forecast[2].date, date(2025, 1, 3));
        assert_eq!(forecast.last().unwrap().date, date(2025, 1, 2) + Duration::days(360));
        assert!(forecast[0].point_estimate >= 50.0);
    }

    #[test]
    fn irregular_history_keeps_only_observed_dates() {
        let series = [
            point(date(2025, 1, 1), 10.0),
            point(date(2025, 1, 5), 20.0),
            point(date(2025, 1, 20), 15.0),
        ];
        let forecast = fit_and_project(&series, 10).unwrap();
        assert_eq!(forecast.len(), 13);
        assert_eq!(forecast[1].date, date(2025, 1, 5));
        assert_eq!(forecast[3].date, date(2025, 1, 21));
        assert!(forecast.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn bounds_bracket_estimate() {
        let values: Vec<f64> = (0..60)
            .map(|i| 50.0 + (i % 7) as f64 * 10.0 + if i % 3 == 0 { 25.0 } else { 0.0 })
            .collect();
        let forecast = fit_and_project(&daily_series(date(2025, 1, 1), &values), 360).unwrap();
        for p in &forecast {
            assert!(p.lower_bound <= p.point_estimate, "{:?}", p);
            assert!(p.point_estimate <= p.upper_bound, "{:?}", p);
        }
    }

    #[test]
    fn rising_series_keeps_rising() {
        let values: Vec<f64> = (0..90).map(|i| 20.0 + 2.0 * i as f64).collect();
        let forecast = fit_and_project(&daily_series(date(2025, 1, 1), &values), 60).unwrap();
        let end_of_history = forecast[89].point_estimate;
        let end_of_horizon = forecast.last().unwrap().point_estimate;
        assert!(end_of_horizon > end_of_history);
    }

    #[test]
    fn band_widens_past_history_when_trend_bends() {
        let values: Vec<f64> = (0..80)
            .map(|i| if i < 40 { 100.0 } else { 100.0 + 5.0 * (i - 40) as f64 } + (i % 2) as f64)
            .collect();
        let forecast = fit_and_project(&daily_series(date(2025, 1, 1), &values), 200).unwrap();
        let width = |p: &ForecastPoint| p.upper_bound - p.lower_bound;
        assert!(width(forecast.last().unwrap()) > width(&forecast[79]));
    }

    #[test]
    fn fit_is_deterministic() {
        let values: Vec<f64> = (0..30).map(|i| (i * 37 % 11) as f64 + 5.0).collect();
        let series = daily_series(date(2025, 2, 1), &values);
        assert_eq!(
            fit_and_project(&series, 30).unwrap(),
            fit_and_project(&series, 30).unwrap()
        );
    }

    #[test]
    fn components_sum_to_estimate() {
        let values: Vec<f64> = (0..21).map(|i| 10.0 + (i % 7) as f64).collect();
        let fitted = ForecastModel::default()
            .fit(&daily_series(date(2025, 1, 1), &values))
            .unwrap()
            .unwrap();
        let d = date(2025, 2, 10);
        let p = fitted.predict(d).unwrap();
        assert_abs_diff_eq!(
            fitted.trend_at(d) + fitted.seasonal_at(d),
            p.point_estimate,
            epsilon = 1e-9
        );
    }

    #[test]
    fn higher_flexibility_fits_kink_more_closely() {
        let values: Vec<f64> = (0..60)
            .map(|i| if i < 30 { 10.0 } else { 10.0 + 4.0 * (i - 30) as f64 })
            .collect();
        let series = daily_series(date(2025, 1, 1), &values);
        let noise = |scale: f64| {
            ForecastModel::new(ForecastConfig {
                changepoint_prior_scale: scale,
                ..ForecastConfig::default()
            })
            .fit(&series)
            .unwrap()
            .unwrap()
            .interval()
            .noise_sd()
        };
        assert!(noise(1.0) < noise(0.01));
    }

    #[test]
    fn all_zero_totals_project_zero() {
        let series = [point(date(2025, 1, 1), 0.0), point(date(2025, 1, 8), 0.0)];
        let forecast = fit_and_project(&series, 5).unwrap();
        for p in forecast {
            assert_abs_diff_eq!(p.point_estimate, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn non_finite_total_is_a_fit_error() {
        let series = [
            point(date(2025, 1, 1), 10.0),
            point(date(2025, 1, 2), f64::INFINITY),
        ];
        assert_eq!(
            fit_and_project(&series, 5).unwrap_err(),
            FitError::NonFiniteInput {
                date: date(2025, 1, 2)
            }
        );
    }

    #[test]
    fn unordered_series_is_a_fit_error() {
        let series = [
            point(date(2025, 1, 3), 10.0),
            point(date(2025, 1, 1), 20.0),
            point(date(2025, 1, 5), 30.0),
        ];
        assert_eq!(
            ForecastModel::default().fit(&series).unwrap_err(),
            FitError::UnorderedSeries { position: 1 }
        );
    }

    #[test]
    fn duplicate_dates_are_a_fit_error() {
        let series = [
            point(date(2025, 1, 1), 10.0),
            point(date(2025, 1, 2), 20.0),
            point(date(2025, 1, 2), 30.0),
        ];
        assert_eq!(
            fit_and_project(&series, 5).unwrap_err(),
            FitError::UnorderedSeries { position: 2 }
        );
    }

    #[test]
    fn horizon_past_calendar_end_is_a_fit_error() {
        let last = NaiveDate::MAX - Duration::days(10);
        let series = [point(last - Duration::days(1), 10.0), point(last, 12.0)];
        assert_eq!(
            fit_and_project(&series, 360).unwrap_err(),
            FitError::HorizonOutOfRange {
                last,
                horizon_days: 360
            }
        );
        // a horizon that still fits the calendar projects normally
        assert_eq!(fit_and_project(&series, 10).unwrap().len(), 2 + 10);
    }

    #[test]
    fn yearly_seasonality_adds_regressors() {
        let values: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let series = daily_series(date(2025, 1, 1), &values);
        let with_yearly = ForecastModel::new(ForecastConfig {
            yearly_seasonality: true,
            ..ForecastConfig::default()
        });
        let forecast = with_yearly.fit_and_project(&series).unwrap();
        assert_eq!(forecast.len(), 30 + 360);
    }

    #[test]
    fn deltas_match_changepoint_count() {
        let values: Vec<f64> = (0..10).map(|i| i as f64 + 1.0).collect();
        let fitted = ForecastModel::default()
            .fit(&daily_series(date(2025, 1, 1), &values))
            .unwrap()
            .unwrap();
        // floor(10 * 0.8) - 1
        assert_eq!(fitted.deltas().len(), 7);
        assert_eq!(fitted.last_history_date(), date(2025, 1, 10));
    }
}

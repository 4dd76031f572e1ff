//! Recompute entry point: one consistent (series, forecast, statuses) triple per call.
//!
//! Every call runs synchronously. The model fit is memoized on the record
//! contents, so a call where only the goals changed re-runs evaluation alone.

use crate::domain::aggregate::{AggregatedPoint, aggregate};
use crate::domain::deposit::DepositRecord;
use crate::domain::error::FitError;
use crate::domain::evaluate::evaluate_all;
use crate::domain::forecast::{ForecastModel, ForecastPoint, MIN_HISTORY_POINTS};
use crate::domain::goal::{Goal, GoalStatus};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::{debug, info, warn};

/// Outcome of the forecasting stage, including the states that render as "no chart".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum ForecastState {
    NoData,
    InsufficientData { points: usize },
    FitFailed { error: FitError },
    Ready(Vec<ForecastPoint>),
}

impl ForecastState {
    /// Forecast points; empty unless the fit succeeded.
    pub fn points(&self) -> &[ForecastPoint] {
        match self {
            ForecastState::Ready(points) => points,
            _ => &[],
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ForecastState::Ready(_))
    }

    pub fn fit_error(&self) -> Option<&FitError> {
        match self {
            ForecastState::FitFailed { error } => Some(error),
            _ => None,
        }
    }

    /// Short headline for presentation.
    pub fn headline(&self) -> &'static str {
        match self {
            ForecastState::NoData => "No Data to Forecast",
            ForecastState::InsufficientData { .. } => "Not enough data to forecast",
            ForecastState::FitFailed { .. } => "Forecast unavailable",
            ForecastState::Ready(_) => "Savings Forecast",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recompute {
    pub series: Vec<AggregatedPoint>,
    pub forecast: ForecastState,
    /// Keyed by goal position in the input slice.
    pub statuses: BTreeMap<usize, GoalStatus>,
}

impl Recompute {
    pub fn forecast_points(&self) -> &[ForecastPoint] {
        self.forecast.points()
    }
}

#[derive(Debug, Clone)]
struct CachedFit {
    fingerprint: u64,
    records: Vec<DepositRecord>,
    series: Vec<AggregatedPoint>,
    forecast: ForecastState,
}

#[derive(Debug, Clone)]
pub struct RecomputeCoordinator {
    model: ForecastModel,
    cache: Option<CachedFit>,
    fits_performed: u64,
}

impl Default for RecomputeCoordinator {
    fn default() -> Self {
        Self::new(ForecastModel::default())
    }
}

impl RecomputeCoordinator {
    pub fn new(model: ForecastModel) -> Self {
        Self {
            model,
            cache: None,
            fits_performed: 0,
        }
    }

    pub fn model(&self) -> &ForecastModel {
        &self.model
    }

    /// Number of model fits actually run (memoized passes excluded).
    pub fn fits_performed(&self) -> u64 {
        self.fits_performed
    }

    /// Drops the memoized fit; the next call refits.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn on_data_changed(&mut self, records: &[DepositRecord], goals: &[Goal]) -> Recompute {
        let (series, forecast) = self.forecast_for(records);
        let statuses = evaluate_all(goals, forecast.points());

        info!(
            records = records.len(),
            goals = goals.len(),
            series = series.len(),
            forecast = forecast.points().len(),
            state = forecast.headline(),
            "recompute pass complete"
        );

        Recompute {
            series,
            forecast,
            statuses,
        }
    }

    fn forecast_for(&mut self, records: &[DepositRecord]) -> (Vec<AggregatedPoint>, ForecastState) {
        let key = fingerprint(records);
        if let Some(cached) = &self.cache
            && cached.fingerprint == key
            && cached.records == records
        {
            debug!(records = records.len(), "reusing memoized forecast");
            return (cached.series.clone(), cached.forecast.clone());
        }

        let series = aggregate(records);
        let forecast = self.run_model(&series);
        self.cache = Some(CachedFit {
            fingerprint: key,
            records: records.to_vec(),
            series: series.clone(),
            forecast: forecast.clone(),
        });
        (series, forecast)
    }

    fn run_model(&mut self, series: &[AggregatedPoint]) -> ForecastState {
        if series.is_empty() {
            return ForecastState::NoData;
        }
        if series.len() < MIN_HISTORY_POINTS {
            return ForecastState::InsufficientData {
                points: series.len(),
            };
        }

        self.fits_performed += 1;
        match self.model.fit_and_project(series) {
            Ok(points) if points.is_empty() => ForecastState::InsufficientData {
                points: series.len(),
            },
            Ok(points) => ForecastState::Ready(points),
            Err(e) => {
                warn!(error = %e, points = series.len(), "forecast fit failed");
                ForecastState::FitFailed { error: e }
            }
        }
    }
}

fn fingerprint(records: &[DepositRecord]) -> u64 {
    let mut hasher = DefaultHasher::new();
    records.len().hash(&mut hasher);
    for record in records {
        record.date().hash(&mut hasher);
        record.amount().to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(amount: f64, d: NaiveDate) -> DepositRecord {
        DepositRecord::new(amount, d).unwrap()
    }

    fn goal(amount: f64, d: NaiveDate) -> Goal {
        Goal::new("", amount, d).unwrap()
    }

    #[test]
    fn no_records_is_no_data() {
        let mut c = RecomputeCoordinator::default();
        let out = c.on_data_changed(&[], &[goal(10.0, date(2025, 1, 1))]);
        assert_eq!(out.forecast, ForecastState::NoData);
        assert!(out.forecast_points().is_empty());
        assert_eq!(out.statuses[&0], GoalStatus::Pending);
        assert_eq!(c.fits_performed(), 0);
    }

    #[test]
    fn single_date_is_insufficient() {
        let mut c = RecomputeCoordinator::default();
        let records = [rec(50.0, date(2025, 1, 1)), rec(25.0, date(2025, 1, 1))];
        let out = c.on_data_changed(&records, &[goal(10.0, date(2025, 1, 1))]);
        assert_eq!(out.forecast, ForecastState::InsufficientData { points: 1 });
        assert_eq!(out.series.len(), 1);
        assert_eq!(out.statuses[&0], GoalStatus::Pending);
    }

    #[test]
    fn two_dates_produce_forecast() {
        let mut c = RecomputeCoordinator::default();
        let records = [rec(100.0, date(2025, 1, 1)), rec(100.0, date(2025, 1, 2))];
        let out = c.on_data_changed(&records, &[goal(50.0, date(2025, 1, 1))]);
        assert!(out.forecast.is_ready());
        assert_eq!(out.forecast_points().len(), 362);
        assert_eq!(out.statuses[&0], GoalStatus::OnTrack);
    }

    #[test]
    fn goal_only_change_reuses_fit() {
        let mut c = RecomputeCoordinator::default();
        let records = [rec(100.0, date(2025, 1, 1)), rec(120.0, date(2025, 1, 8))];
        let first = c.on_data_changed(&records, &[]);
        let second = c.on_data_changed(&records, &[goal(1_000_000.0, date(2025, 6, 1))]);
        assert_eq!(c.fits_performed(), 1);
        assert_eq!(first.forecast, second.forecast);
        assert_eq!(second.statuses[&0], GoalStatus::OffTrack);
    }

    #[test]
    fn record_change_refits() {
        let mut c = RecomputeCoordinator::default();
        let mut records = vec![rec(100.0, date(2025, 1, 1)), rec(120.0, date(2025, 1, 8))];
        c.on_data_changed(&records, &[]);
        records.push(rec(80.0, date(2025, 1, 15)));
        let out = c.on_data_changed(&records, &[]);
        assert_eq!(c.fits_performed(), 2);
        assert_eq!(out.series.len(), 3);
    }

    #[test]
    fn invalidate_forces_refit() {
        let mut c = RecomputeCoordinator::default();
        let records = [rec(100.0, date(2025, 1, 1)), rec(120.0, date(2025, 1, 8))];
        c.on_data_changed(&records, &[]);
        c.invalidate();
        c.on_data_changed(&records, &[]);
        assert_eq!(c.fits_performed(), 2);
    }

    #[test]
    fn fingerprint_depends_on_order_and_values() {
        let a = rec(1.0, date(2025, 1, 1));
        let b = rec(2.0, date(2025, 1, 2));
        assert_eq!(fingerprint(&[a, b]), fingerprint(&[a, b]));
        assert_ne!(fingerprint(&[a, b]), fingerprint(&[b, a]));
        assert_ne!(fingerprint(&[a]), fingerprint(&[a, b]));
    }

    #[test]
    fn overflowing_totals_fail_the_fit_without_panicking() {
        let mut c = RecomputeCoordinator::default();
        let records = [
            rec(f64::MAX, date(2025, 1, 1)),
            rec(f64::MAX, date(2025, 1, 1)),
            rec(1.0, date(2025, 1, 2)),
        ];
        let out = c.on_data_changed(&records, &[goal(1.0, date(2025, 1, 2))]);
        assert_eq!(
            out.forecast.fit_error(),
            Some(&FitError::NonFiniteInput {
                date: date(2025, 1, 1)
            })
        );
        assert!(out.forecast_points().is_empty());
        assert_eq!(out.statuses[&0], GoalStatus::Pending);
        assert_eq!(out.forecast.headline(), "Forecast unavailable");
    }

    #[test]
    fn headlines() {
        assert_eq!(ForecastState::NoData.headline(), "No Data to Forecast");
        assert_eq!(
            ForecastState::InsufficientData { points: 1 }.headline(),
            "Not enough data to forecast"
        );
    }
}

//! Goal classification against a forecast.

use crate::domain::forecast::ForecastPoint;
use crate::domain::goal::{Goal, GoalStatus};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Point whose date is closest to `target`; ties go to the earlier date.
pub fn nearest_point(forecast: &[ForecastPoint], target: NaiveDate) -> Option<&ForecastPoint> {
    forecast
        .iter()
        .min_by_key(|p| ((p.date - target).num_days().abs(), p.date))
}

pub fn evaluate(goal: &Goal, forecast: &[ForecastPoint]) -> GoalStatus {
    match nearest_point(forecast, goal.target_date()) {
        None => GoalStatus::Pending,
        Some(p) if p.point_estimate >= goal.target_amount() => GoalStatus::OnTrack,
        Some(_) => GoalStatus::OffTrack,
    }
}

/// Status of every goal, keyed by its position in `goals`.
pub fn evaluate_all(goals: &[Goal], forecast: &[ForecastPoint]) -> BTreeMap<usize, GoalStatus> {
    goals
        .iter()
        .enumerate()
        .map(|(i, goal)| (i, evaluate(goal, forecast)))
        .collect()
}

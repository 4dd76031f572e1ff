//! Report generation port and the presentation-ready report structure.

use crate::domain::aggregate::AggregatedPoint;
use crate::domain::error::SavecastError;
use crate::domain::forecast::ForecastPoint;
use crate::domain::goal::{GoalId, GoalStatus};
use crate::domain::session::Dashboard;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;

/// One goal row as presented to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalReport {
    pub id: GoalId,
    pub name: String,
    pub target_amount: f64,
    pub target_date: NaiveDate,
    pub status: GoalStatus,
}

/// Flattened view of a [`Dashboard`] for writers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub revision: u64,
    pub headline: String,
    pub series: Vec<AggregatedPoint>,
    pub forecast: Vec<ForecastPoint>,
    pub goals: Vec<GoalReport>,
}

impl From<&Dashboard> for Report {
    fn from(dashboard: &Dashboard) -> Self {
        Report {
            revision: dashboard.revision(),
            headline: dashboard.result.forecast.headline().to_string(),
            series: dashboard.result.series.clone(),
            forecast: dashboard.forecast().to_vec(),
            goals: dashboard
                .goal_rows()
                .map(|(id, goal, status)| GoalReport {
                    id,
                    name: goal.name().to_string(),
                    target_amount: goal.target_amount(),
                    target_date: goal.target_date(),
                    status,
                })
                .collect(),
        }
    }
}

/// Port for writing reports.
pub trait ReportPort {
    fn render(&self, report: &Report) -> Result<String, SavecastError>;

    /// Default implementation: renders and writes the result to `output_path`.
    fn write(&self, report: &Report, output_path: &str) -> Result<(), SavecastError> {
        let content = self.render(report)?;
        fs::write(output_path, content)?;
        Ok(())
    }
}

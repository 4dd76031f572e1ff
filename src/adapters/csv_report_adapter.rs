//! CSV report adapter implementing ReportPort.
//!
//! Writes either the forecast band or the goal table of a [`Report`].

use crate::domain::error::SavecastError;
use crate::ports::report_port::{Report, ReportPort};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvSection {
    /// `date,point_estimate,lower_bound,upper_bound`
    Forecast,
    /// `id,name,target_amount,target_date,status`
    Goals,
}

pub struct CsvReportAdapter {
    section: CsvSection,
}

#[derive(Serialize)]
struct GoalRow<'a> {
    id: String,
    name: &'a str,
    target_amount: f64,
    target_date: NaiveDate,
    status: String,
}

impl CsvReportAdapter {
    pub fn new(section: CsvSection) -> Self {
        Self { section }
    }

    fn csv_error(e: impl std::fmt::Display) -> SavecastError {
        SavecastError::Io(std::io::Error::other(format!("CSV write error: {e}")))
    }
}

impl ReportPort for CsvReportAdapter {
    fn render(&self, report: &Report) -> Result<String, SavecastError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());

        match self.section {
            CsvSection::Forecast => {
                if report.forecast.is_empty() {
                    wtr.write_record(["date", "point_estimate", "lower_bound", "upper_bound"])
                        .map_err(Self::csv_error)?;
                }
                for point in &report.forecast {
                    wtr.serialize(point).map_err(Self::csv_error)?;
                }
            }
            CsvSection::Goals => {
                if report.goals.is_empty() {
                    wtr.write_record(["id", "name", "target_amount", "target_date", "status"])
                        .map_err(Self::csv_error)?;
                }
                for goal in &report.goals {
                    wtr.serialize(GoalRow {
                        id: goal.id.to_string(),
                        name: &goal.name,
                        target_amount: goal.target_amount,
                        target_date: goal.target_date,
                        status: goal.status.to_string(),
                    })
                    .map_err(Self::csv_error)?;
                }
            }
        }

        let bytes = wtr.into_inner().map_err(Self::csv_error)?;
        String::from_utf8(bytes).map_err(Self::csv_error)
    }
}

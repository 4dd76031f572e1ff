//! Savings goals and their evaluation status.

use crate::domain::deposit::parse_iso_date;
use crate::domain::error::SavecastError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const UNNAMED_GOAL: &str = "Unnamed Goal";

/// Stable identifier assigned to a goal when a session accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GoalId(pub u64);

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// A target amount to be reached by a target date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Goal {
    name: String,
    target_amount: f64,
    target_date: NaiveDate,
}

impl Goal {
    /// Blank names fall back to [`UNNAMED_GOAL`]; the amount must be positive.
    pub fn new(
        name: &str,
        target_amount: f64,
        target_date: NaiveDate,
    ) -> Result<Self, SavecastError> {
        if !target_amount.is_finite() || target_amount <= 0.0 {
            return Err(SavecastError::invalid(
                "target_amount",
                "must be a positive number",
            ));
        }
        let name = match name.trim() {
            "" => UNNAMED_GOAL.to_string(),
            trimmed => trimmed.to_string(),
        };
        Ok(Self {
            name,
            target_amount,
            target_date,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_amount(&self) -> f64 {
        self.target_amount
    }

    pub fn target_date(&self) -> NaiveDate {
        self.target_date
    }
}

/// Goal as supplied by the session layer: `{name, amount, date}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalInput {
    #[serde(default)]
    pub name: Option<String>,
    pub amount: f64,
    pub date: String,
}

impl GoalInput {
    pub fn new(name: Option<&str>, amount: f64, date: impl Into<String>) -> Self {
        Self {
            name: name.map(str::to_string),
            amount,
            date: date.into(),
        }
    }
}

impl TryFrom<&GoalInput> for Goal {
    type Error = SavecastError;

    fn try_from(input: &GoalInput) -> Result<Self, Self::Error> {
        let date = parse_iso_date(&input.date, "target_date")?;
        Goal::new(input.name.as_deref().unwrap_or_default(), input.amount, date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalStatus {
    OnTrack,
    OffTrack,
    /// No forecast is available to judge the goal against.
    Pending,
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GoalStatus::OnTrack => "On Track",
            GoalStatus::OffTrack => "Off Track",
            GoalStatus::Pending => "Pending",
        };
        f.write_str(label)
    }
}

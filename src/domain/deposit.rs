//! Savings deposit records and their raw input form.

use crate::domain::error::SavecastError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier assigned to a deposit when a session accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DepositId(pub u64);

impl fmt::Display for DepositId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// A single savings contribution. Negative amounts are withdrawals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepositRecord {
    amount: f64,
    date: NaiveDate,
}

impl DepositRecord {
    pub fn new(amount: f64, date: NaiveDate) -> Result<Self, SavecastError> {
        if !amount.is_finite() {
            return Err(SavecastError::invalid("amount", "must be a finite number"));
        }
        if amount == 0.0 {
            return Err(SavecastError::invalid("amount", "must be non-zero"));
        }
        Ok(Self { amount, date })
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Deposit as supplied by the session layer: `{amount, date}` with an ISO date string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositInput {
    pub amount: f64,
    pub date: String,
}

impl DepositInput {
    pub fn new(amount: f64, date: impl Into<String>) -> Self {
        Self {
            amount,
            date: date.into(),
        }
    }
}

impl TryFrom<&DepositInput> for DepositRecord {
    type Error = SavecastError;

    fn try_from(input: &DepositInput) -> Result<Self, Self::Error> {
        let date = parse_iso_date(&input.date, "date")?;
        DepositRecord::new(input.amount, date)
    }
}

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses `YYYY-MM-DD`, also accepting an ISO-8601 timestamp whose date part is kept.
///
/// Timestamps may carry a `Z` or `+hh:mm` offset; the date is taken as written,
/// not converted to UTC.
pub fn parse_iso_date(value: &str, field: &str) -> Result<NaiveDate, SavecastError> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| {
            SavecastError::invalid(
                field,
                format!("'{}' is not an ISO-8601 date (expected YYYY-MM-DD)", trimmed),
            )
        })
}

//! Normalizes raw deposits into one total per calendar date.

use crate::domain::deposit::DepositRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregatedPoint {
    pub date: NaiveDate,
    pub total_amount: f64,
}

/// Sums deposits sharing a date. Output dates are unique and strictly increasing.
pub fn aggregate(records: &[DepositRecord]) -> Vec<AggregatedPoint> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.date()).or_insert(0.0) += record.amount();
    }
    totals
        .into_iter()
        .map(|(date, total_amount)| AggregatedPoint { date, total_amount })
        .collect()
}

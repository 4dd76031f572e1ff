#![allow(dead_code)]

use chrono::NaiveDate;
use savecast::domain::deposit::{DepositInput, DepositRecord};
use savecast::domain::error::SavecastError;
use savecast::domain::goal::{Goal, GoalInput};
use savecast::ports::ledger_port::LedgerPort;
use savecast::ports::report_port::{Report, ReportPort};
use std::cell::RefCell;
use std::io::Write;

pub struct MockLedgerPort {
    pub deposits: Vec<DepositInput>,
    pub goals: Vec<GoalInput>,
    pub error: Option<String>,
}

impl MockLedgerPort {
    pub fn new() -> Self {
        Self {
            deposits: Vec::new(),
            goals: Vec::new(),
            error: None,
        }
    }

    pub fn with_deposit(mut self, amount: f64, date: &str) -> Self {
        self.deposits.push(DepositInput::new(amount, date));
        self
    }

    pub fn with_goal(mut self, name: Option<&str>, amount: f64, date: &str) -> Self {
        self.goals.push(GoalInput::new(name, amount, date));
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }

    fn check(&self) -> Result<(), SavecastError> {
        match &self.error {
            Some(reason) => Err(SavecastError::Ledger {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl LedgerPort for MockLedgerPort {
    fn load_deposits(&self) -> Result<Vec<DepositInput>, SavecastError> {
        self.check()?;
        Ok(self.deposits.clone())
    }

    fn load_goals(&self) -> Result<Vec<GoalInput>, SavecastError> {
        self.check()?;
        Ok(self.goals.clone())
    }
}

/// Captures every report handed to it.
pub struct MockReportPort {
    pub reports: RefCell<Vec<Report>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self {
            reports: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for MockReportPort {
    fn render(&self, report: &Report) -> Result<String, SavecastError> {
        self.reports.borrow_mut().push(report.clone());
        Ok(format!("{} ({} points)", report.headline, report.forecast.len()))
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn record(amount: f64, d: &str) -> DepositRecord {
    DepositRecord::new(amount, date(d)).unwrap()
}

pub fn goal(amount: f64, d: &str) -> Goal {
    Goal::new("", amount, date(d)).unwrap()
}

/// Weekly deposits of `amount` starting at `start`.
pub fn weekly_records(start: &str, weeks: i64, amount: f64) -> Vec<DepositRecord> {
    let first = date(start);
    (0..weeks)
        .map(|w| DepositRecord::new(amount, first + chrono::Duration::weeks(w)).unwrap())
        .collect()
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

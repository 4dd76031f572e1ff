//! CSV file ledger adapter.
//!
//! Deposits are read from a `date,amount` file and goals from an optional
//! `name,amount,date` file. Columns are matched by header name.

use crate::domain::deposit::DepositInput;
use crate::domain::error::SavecastError;
use crate::domain::goal::GoalInput;
use crate::ports::ledger_port::LedgerPort;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvLedger {
    deposits_path: PathBuf,
    goals_path: Option<PathBuf>,
}

impl CsvLedger {
    pub fn new(deposits_path: PathBuf, goals_path: Option<PathBuf>) -> Self {
        Self {
            deposits_path,
            goals_path,
        }
    }

    fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SavecastError> {
        let content = fs::read_to_string(path).map_err(|e| SavecastError::Ledger {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        rdr.deserialize()
            .map(|row| {
                row.map_err(|e| SavecastError::Ledger {
                    reason: format!("CSV parse error in {}: {}", path.display(), e),
                })
            })
            .collect()
    }
}

impl LedgerPort for CsvLedger {
    fn load_deposits(&self) -> Result<Vec<DepositInput>, SavecastError> {
        Self::read_rows(&self.deposits_path)
    }

    fn load_goals(&self) -> Result<Vec<GoalInput>, SavecastError> {
        match &self.goals_path {
            Some(path) => Self::read_rows(path),
            None => Ok(Vec::new()),
        }
    }
}

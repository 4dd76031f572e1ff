//! Source of a user's raw deposits and goals.

use crate::domain::deposit::DepositInput;
use crate::domain::error::SavecastError;
use crate::domain::goal::GoalInput;

/// Loads unvalidated inputs; conversion to domain types happens in the session.
pub trait LedgerPort {
    fn load_deposits(&self) -> Result<Vec<DepositInput>, SavecastError>;

    /// Goals are optional; a ledger without any returns an empty list.
    fn load_goals(&self) -> Result<Vec<GoalInput>, SavecastError>;
}

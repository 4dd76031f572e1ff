//! Core domain types and logic.

pub mod aggregate;
pub mod config_validation;
pub mod coordinator;
pub mod deposit;
pub mod error;
pub mod evaluate;
pub mod forecast;
pub mod goal;
pub mod session;

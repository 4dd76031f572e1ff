//! savecast: savings forecast and goal-tracking engine.
//!
//! Deposits are aggregated into a daily series, a trend + seasonality model
//! projects it with an uncertainty band, and each savings goal is classified
//! against the projection.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod ports;

//! Domain error types.

/// Numerical failure while fitting or projecting the forecast model.
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitError {
    #[error("series contains a non-finite amount on {date}")]
    NonFiniteInput { date: chrono::NaiveDate },

    #[error("normal equations are not positive definite (pivot {pivot})")]
    Singular { pivot: usize },

    #[error("projection produced a non-finite value on {date}")]
    NonFiniteOutput { date: chrono::NaiveDate },

    #[error("series dates are not strictly ascending at position {position}")]
    UnorderedSeries { position: usize },

    #[error("forecast horizon of {horizon_days} days past {last} leaves the calendar range")]
    HorizonOutOfRange {
        last: chrono::NaiveDate,
        horizon_days: u32,
    },
}

/// Top-level error type for savecast.
#[derive(Debug, thiserror::Error)]
pub enum SavecastError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("ledger error: {reason}")]
    Ledger { reason: String },

    #[error("forecast fit failed: {0}")]
    ForecastFit(#[from] FitError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SavecastError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        SavecastError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&SavecastError> for std::process::ExitCode {
    fn from(err: &SavecastError) -> Self {
        let code: u8 = match err {
            SavecastError::Io(_) => 1,
            SavecastError::ConfigParse { .. } | SavecastError::ConfigInvalid { .. } => 2,
            SavecastError::Ledger { .. } | SavecastError::InvalidInput { .. } => 3,
            SavecastError::ForecastFit(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}

//! Configuration validation.
//!
//! Checks the optional `[forecast]` section before a model is built. Missing
//! keys are fine; they fall back to the defaults.

use crate::domain::error::SavecastError;
use crate::domain::forecast::{
    DEFAULT_CHANGEPOINT_PRIOR_SCALE, DEFAULT_CHANGEPOINT_RANGE, DEFAULT_HORIZON_DAYS,
    DEFAULT_INTERVAL_WIDTH, DEFAULT_N_CHANGEPOINTS, DEFAULT_SEASONALITY_PRIOR_SCALE,
    ForecastConfig,
};
use crate::ports::config_port::ConfigPort;

const SECTION: &str = "forecast";
const MAX_HORIZON_DAYS: i64 = 3650;

impl ForecastConfig {
    /// Builds a model configuration from the `[forecast]` section.
    ///
    /// Absent keys keep their defaults. The section is validated first.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SavecastError> {
        validate_forecast_config(config)?;
        let defaults = ForecastConfig::default();
        Ok(ForecastConfig {
            changepoint_prior_scale: config.get_double(
                SECTION,
                "changepoint_prior_scale",
                defaults.changepoint_prior_scale,
            ),
            n_changepoints: config.get_int(
                SECTION,
                "n_changepoints",
                defaults.n_changepoints as i64,
            ) as usize,
            changepoint_range: config.get_double(
                SECTION,
                "changepoint_range",
                defaults.changepoint_range,
            ),
            seasonality_prior_scale: config.get_double(
                SECTION,
                "seasonality_prior_scale",
                defaults.seasonality_prior_scale,
            ),
            yearly_seasonality: config.get_bool(
                SECTION,
                "yearly_seasonality",
                defaults.yearly_seasonality,
            ),
            weekly_seasonality: config.get_bool(
                SECTION,
                "weekly_seasonality",
                defaults.weekly_seasonality,
            ),
            daily_seasonality: config.get_bool(
                SECTION,
                "daily_seasonality",
                defaults.daily_seasonality,
            ),
            interval_width: config.get_double(SECTION, "interval_width", defaults.interval_width),
            horizon_days: config.get_int(
                SECTION,
                "horizon_days",
                i64::from(defaults.horizon_days),
            ) as u32,
        })
    }
}

pub fn validate_forecast_config(config: &dyn ConfigPort) -> Result<(), SavecastError> {
    validate_changepoint_prior_scale(config)?;
    validate_changepoint_range(config)?;
    validate_n_changepoints(config)?;
    validate_seasonality_prior_scale(config)?;
    validate_interval_width(config)?;
    validate_horizon(config)?;
    Ok(())
}

fn invalid(key: &str, reason: &str) -> SavecastError {
    SavecastError::ConfigInvalid {
        section: SECTION.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_changepoint_prior_scale(config: &dyn ConfigPort) -> Result<(), SavecastError> {
    let value = config.get_double(SECTION, "changepoint_prior_scale", DEFAULT_CHANGEPOINT_PRIOR_SCALE);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "changepoint_prior_scale",
            "changepoint_prior_scale must be positive",
        ));
    }
    Ok(())
}

fn validate_changepoint_range(config: &dyn ConfigPort) -> Result<(), SavecastError> {
    let value = config.get_double(SECTION, "changepoint_range", DEFAULT_CHANGEPOINT_RANGE);
    if !(value > 0.0 && value <= 1.0) {
        return Err(invalid(
            "changepoint_range",
            "changepoint_range must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_n_changepoints(config: &dyn ConfigPort) -> Result<(), SavecastError> {
    let value = config.get_int(SECTION, "n_changepoints", DEFAULT_N_CHANGEPOINTS as i64);
    if !(0..=100).contains(&value) {
        return Err(invalid(
            "n_changepoints",
            "n_changepoints must be between 0 and 100",
        ));
    }
    Ok(())
}

fn validate_seasonality_prior_scale(config: &dyn ConfigPort) -> Result<(), SavecastError> {
    let value = config.get_double(SECTION, "seasonality_prior_scale", DEFAULT_SEASONALITY_PRIOR_SCALE);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "seasonality_prior_scale",
            "seasonality_prior_scale must be positive",
        ));
    }
    Ok(())
}

fn validate_interval_width(config: &dyn ConfigPort) -> Result<(), SavecastError> {
    let value = config.get_double(SECTION, "interval_width", DEFAULT_INTERVAL_WIDTH);
    if !(value > 0.0 && value < 1.0) {
        return Err(invalid(
            "interval_width",
            "interval_width must be between 0 and 1 (exclusive)",
        ));
    }
    Ok(())
}

fn validate_horizon(config: &dyn ConfigPort) -> Result<(), SavecastError> {
    let value = config.get_int(SECTION, "horizon_days", i64::from(DEFAULT_HORIZON_DAYS));
    if !(1..=MAX_HORIZON_DAYS).contains(&value) {
        return Err(invalid(
            "horizon_days",
            "horizon_days must be between 1 and 3650",
        ));
    }
    Ok(())
}

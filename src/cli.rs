//! CLI definition and dispatch.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvLedger;
use crate::adapters::csv_report_adapter::{CsvReportAdapter, CsvSection};
use crate::adapters::file_config_adapter::FileConfigAdapter;
#[cfg(feature = "json")]
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::config_validation::validate_forecast_config;
use crate::domain::error::SavecastError;
use crate::domain::forecast::{ForecastConfig, ForecastModel};
use crate::domain::session::Session;
use crate::logging::{LoggingConfig, init_logging};
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;
use crate::ports::report_port::{Report, ReportPort};

#[derive(Parser, Debug)]
#[command(name = "savecast", about = "Savings forecast and goal tracking")]
pub struct Cli {
    /// Raise diagnostic log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    #[cfg(feature = "json")]
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fit the savings series and write the forecast band
    Forecast {
        #[arg(short, long)]
        deposits: PathBuf,
        #[arg(short, long)]
        goals: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
    /// Classify each goal as on track or off track
    Status {
        #[arg(short, long)]
        deposits: PathBuf,
        #[arg(short, long)]
        goals: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
    /// Validate a forecast configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let logging = LoggingConfig::from_env().with_verbosity(cli.verbose);
    if let Err(e) = init_logging(&logging) {
        eprintln!("warning: diagnostic logging disabled: {e}");
    }

    match cli.command {
        Command::Forecast {
            deposits,
            goals,
            config,
            output,
            format,
        } => run_report(
            &deposits,
            goals.as_deref(),
            config.as_deref(),
            output.as_deref(),
            format,
            CsvSection::Forecast,
        ),
        Command::Status {
            deposits,
            goals,
            config,
            output,
            format,
        } => run_report(
            &deposits,
            Some(&goals),
            config.as_deref(),
            output.as_deref(),
            format,
            CsvSection::Goals,
        ),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Model configuration from an optional INI file; defaults when none is given.
pub fn resolve_forecast_config(path: Option<&Path>) -> Result<ForecastConfig, SavecastError> {
    match path {
        Some(path) => ForecastConfig::from_config(&FileConfigAdapter::from_file(path)?),
        None => Ok(ForecastConfig::default()),
    }
}

/// Loads every deposit and goal from `ledger` into a fresh session.
///
/// The batch is all-or-nothing: one invalid row rejects the whole ledger.
pub fn load_session(
    ledger: &dyn LedgerPort,
    config: ForecastConfig,
) -> Result<Session, SavecastError> {
    let deposits = ledger.load_deposits()?;
    let goals = ledger.load_goals()?;
    let mut session = Session::new(ForecastModel::new(config));
    session.import(&deposits, &goals)?;
    Ok(session)
}

pub fn reporter(format: OutputFormat, section: CsvSection) -> Box<dyn ReportPort> {
    match format {
        OutputFormat::Csv => Box::new(CsvReportAdapter::new(section)),
        #[cfg(feature = "json")]
        OutputFormat::Json => Box::new(JsonReportAdapter::new(true)),
    }
}

fn run_report(
    deposits_path: &Path,
    goals_path: Option<&Path>,
    config_path: Option<&Path>,
    output_path: Option<&Path>,
    format: OutputFormat,
    section: CsvSection,
) -> ExitCode {
    // Stage 1: Model configuration
    if let Some(path) = config_path {
        eprintln!("Loading config from {}", path.display());
    }
    let config = match resolve_forecast_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 2: Ledger
    eprintln!("Loading deposits from {}", deposits_path.display());
    if let Some(path) = goals_path {
        eprintln!("Loading goals from {}", path.display());
    }
    let ledger = CsvLedger::new(
        deposits_path.to_path_buf(),
        goals_path.map(Path::to_path_buf),
    );

    // Stage 3: Recompute
    let session = match load_session(&ledger, config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let dashboard = session.view();
    let state = &dashboard.result.forecast;

    eprintln!(
        "{}: {} deposits on {} dates, {} goals, {} forecast points",
        state.headline(),
        dashboard.snapshot.deposits().len(),
        dashboard.result.series.len(),
        dashboard.snapshot.goals().len(),
        dashboard.forecast().len(),
    );

    if let Some(err) = state.fit_error() {
        let err = SavecastError::ForecastFit(err.clone());
        eprintln!("error: {err}");
        return (&err).into();
    }

    // Stage 4: Report
    let report = Report::from(dashboard);
    let port = reporter(format, section);
    let result = match output_path {
        Some(path) => port.write(&report, &path.to_string_lossy()).map(|()| {
            eprintln!("Report written to {}", path.display());
        }),
        None => port.render(&report).map(|content| print!("{content}")),
    };

    match result {
        Ok(()) => {
            info!(revision = report.revision, "report complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if !adapter.has_section("forecast") {
        eprintln!("note: no [forecast] section, defaults apply");
    }

    if let Err(e) = validate_forecast_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let config = match ForecastConfig::from_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nForecast settings:");
    eprintln!("  changepoint_prior_scale: {}", config.changepoint_prior_scale);
    eprintln!("  n_changepoints:          {}", config.n_changepoints);
    eprintln!("  changepoint_range:       {}", config.changepoint_range);
    eprintln!("  seasonality_prior_scale: {}", config.seasonality_prior_scale);
    eprintln!(
        "  seasonality:             yearly={} weekly={} daily={}",
        config.yearly_seasonality, config.weekly_seasonality, config.daily_seasonality
    );
    eprintln!("  interval_width:          {}", config.interval_width);
    eprintln!("  horizon_days:            {}", config.horizon_days);
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_forecast_command() {
        let cli = Cli::try_parse_from([
            "savecast",
            "forecast",
            "--deposits",
            "d.csv",
            "-g",
            "g.csv",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Forecast {
                deposits,
                goals,
                config,
                output,
                format,
            } => {
                assert_eq!(deposits, PathBuf::from("d.csv"));
                assert_eq!(goals, Some(PathBuf::from("g.csv")));
                assert!(config.is_none());
                assert!(output.is_none());
                assert_eq!(format, OutputFormat::Csv);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn status_requires_goals() {
        assert!(Cli::try_parse_from(["savecast", "status", "--deposits", "d.csv"]).is_err());
    }

    #[test]
    fn validate_requires_config() {
        assert!(Cli::try_parse_from(["savecast", "validate"]).is_err());
    }

    #[cfg(feature = "json")]
    #[test]
    fn parses_json_format() {
        let cli = Cli::try_parse_from([
            "savecast", "status", "-d", "d.csv", "-g", "g.csv", "--format", "json",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Status {
                format: OutputFormat::Json,
                ..
            }
        ));
    }

    #[test]
    fn resolve_without_file_uses_defaults() {
        assert_eq!(resolve_forecast_config(None).unwrap(), ForecastConfig::default());
    }
}

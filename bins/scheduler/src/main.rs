//! Deprecia scenario runner
//!
//! Reads a scenario file, runs it through the depreciation engine and prints
//! the resulting boards as JSON on stdout. Logs go to stderr.

mod scenario;

use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use deprecia_shared::{AppConfig, AppError, LogFormat, LoggingConfig};

use crate::scenario::Scenario;

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            let err = AppError::from(err);
            eprintln!("{err}");
            return exit_code(&err);
        }
    };
    init_tracing(&config.logging);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<AppError>()
                .map_or(ExitCode::FAILURE, exit_code);
            error!(error = %format!("{err:#}"), "Scenario failed");
            code
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn run(config: &AppConfig) -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DEPRECIA_SCENARIO").ok())
        .ok_or_else(|| {
            AppError::Validation("usage: deprecia <scenario.json> or set DEPRECIA_SCENARIO".into())
        })?;

    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let scenario: Scenario = serde_json::from_str(&raw)
        .map_err(|err| AppError::Validation(format!("invalid scenario {path}: {err}")))?;
    info!(path = %path, steps = scenario.steps.len(), "Scenario loaded");

    let report = scenario::run(scenario, &config.schedule).map_err(AppError::from)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn exit_code(err: &AppError) -> ExitCode {
    u8::try_from(err.exit_code()).map_or(ExitCode::FAILURE, ExitCode::from)
}

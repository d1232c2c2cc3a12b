use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use parlay::adapter::inbound::cli::command::Cli;
use parlay::adapter::inbound::cli::diagnostic::{self, StorageError};
use parlay::adapter::inbound::cli::output::{self, OutputConfig};
use parlay::config::Config;
use parlay::error::{ConfigError, Error};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    let mut config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            report_config_error(&cli.config, &e);
            return ExitCode::FAILURE;
        }
    };
    match cli.verbose {
        0 => {}
        1 => config.logging.level = "debug".into(),
        _ => config.logging.level = "trace".into(),
    }
    config.init_logging();

    match parlay::adapter::inbound::cli::execute(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_internal() => {
            error!(error = %e, "Command failed");
            let report = miette::Report::new(StorageError {
                message: e.public_message(),
            });
            if output::is_json() {
                output::error(&e.public_message());
            } else {
                eprintln!("{report:?}");
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            output::error(&e.public_message());
            ExitCode::FAILURE
        }
    }
}

fn report_config_error(path: &Path, err: &Error) {
    if let Error::Config(ConfigError::Parse(parse)) = err {
        if let Ok(src) = std::fs::read_to_string(path) {
            if !output::is_json() {
                let report = miette::Report::new(diagnostic::ConfigError::from_toml(parse, &src));
                eprintln!("{report:?}");
                return;
            }
        }
    }
    output::error(&format!("Failed to load config {}: {err}", path.display()));
}

//! mailcal CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use mailcal_core::{TracingConfig, TracingOutputFormat, init_tracing};

use mailcal_client::cli::{Cli, Command, ConfigAction};
use mailcal_client::commands::run::RunOptions;
use mailcal_client::config::ClientConfig;
use mailcal_client::error::ClientResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut tracing_config = TracingConfig::cli(cli.debug);
    if cli.json_logs {
        tracing_config = tracing_config.with_format(TracingOutputFormat::Json);
    }
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns false when the run finished but some messages failed.
async fn run(cli: Cli) -> ClientResult<bool> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let mut config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path)?
    } else {
        ClientConfig::load()?
    };
    config.apply_cli(&cli);

    match cli.command {
        Some(Command::Config { action }) => {
            match action {
                ConfigAction::Dump => mailcal_client::commands::config::dump(&config, &config_path)?,
                ConfigAction::Validate => mailcal_client::commands::config::validate(&config)?,
                ConfigAction::Path => mailcal_client::commands::config::path(&config_path)?,
            }
            Ok(true)
        }
        Some(Command::Run) | None => {
            let options = RunOptions {
                fail_fast: cli.fail_fast,
                json: cli.json,
            };
            let report = mailcal_client::commands::run::run(&config, options).await?;
            Ok(report.is_success())
        }
    }
}

//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// mailcal - Turn booking mail into calendar events
#[derive(Debug, Parser)]
#[command(name = "mailcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "MAILCAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    // --- Overrides for config.toml ---
    /// Mail label to process
    #[arg(long, short)]
    pub label: Option<String>,

    /// Path to the JSON mailbox file
    #[arg(long, env = "MAILCAL_MAILBOX")]
    pub mailbox: Option<PathBuf>,

    /// Provider: Nightride, Wellpass or Tickets
    #[arg(long, short)]
    pub method: Option<String>,

    /// Gemini API key for the Tickets provider
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Forward PDF attachments of bookings to this address
    #[arg(long)]
    pub forward_to: Option<String>,

    /// Leave processed messages out of the trash
    #[arg(long)]
    pub keep_messages: bool,

    // --- Run behaviour ---
    /// Stop at the first message that fails
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process the configured label (default)
    Run,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration without touching mail or calendar.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    let core = config.to_core_config()?;
    config.label()?;
    config.mailbox_path()?;
    config.calendar.build()?;

    println!(
        "Configuration is valid: method {}, default duration {} min, max duration {} min.",
        core.method(),
        core.default_duration(),
        core.max_duration()
    );
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}

//! Config command implementation.
//!
//! `qrep config [--config <file>]` prints the effective configuration as
//! YAML, ready to be edited and passed back with `--config`.

use anyhow::Result;

use super::common::load_config;

/// Execute the config command.
pub fn execute(config_path: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    print!("{}", config.to_yaml()?);
    Ok(())
}

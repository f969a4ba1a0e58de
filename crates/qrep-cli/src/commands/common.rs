//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use qrep_core::SweepConfig;

/// Resolve the sweep configuration: file (or defaults), then `QREP_*`
/// environment overrides.
pub fn load_config(path: Option<&str>) -> Result<SweepConfig> {
    let mut config = match path {
        Some(path) => {
            if !Path::new(path).exists() {
                anyhow::bail!("Config file not found: {path}");
            }
            SweepConfig::from_file(path)
                .with_context(|| format!("Failed to load config: {path}"))?
        }
        None => SweepConfig::default(),
    };

    config.apply_env(|key| std::env::var(key).ok());
    config
        .validate()
        .context("Invalid configuration after environment overrides")?;
    debug!(?config, "resolved configuration");
    Ok(config)
}

/// Progress bar over the lengths of a sweep, drawn on stderr.
pub fn length_progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("#>-"),
    );
    pb.set_message("lengths");
    Ok(pb)
}

/// Format an expected pair count for tables.
pub fn format_cost(cost: f64) -> String {
    if cost >= 1e6 {
        format!("{cost:.3e}")
    } else {
        format!("{cost:.2}")
    }
}

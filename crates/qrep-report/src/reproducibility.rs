//! What a rerun needs to reproduce a sweep bit for bit.
//!
//! The physics is deterministic, so the output is fixed by the resolved
//! configuration alone. The digest covers every field of it, including
//! values that came from `QREP_*` variables rather than the file.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use qrep_core::SweepConfig;
use qrep_core::sweep::PARALLEL_BACKEND;

use crate::error::ReportResult;
use crate::report::SCHEMA_VERSION;

/// Run context recorded next to the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReproducibilityInfo {
    /// qrep version used.
    pub qrep_version: String,
    /// Schema version of the output format.
    pub schema_version: String,
    /// Command line, if the run came from the CLI.
    pub cli_args: Vec<String>,
    /// SHA-256 of the resolved configuration, hex encoded.
    pub config_digest: String,
    /// Trials ran on the rayon pool.
    pub parallel: bool,
    /// The build carried the rayon backend at all.
    pub parallel_backend: bool,
    /// Round cap that bounded every purification loop.
    pub max_purification_rounds: u32,
}

impl ReproducibilityInfo {
    /// Capture the context of a sweep run with `config`.
    pub fn capture(config: &SweepConfig, cli_args: &[String]) -> ReportResult<Self> {
        Ok(Self {
            qrep_version: env!("CARGO_PKG_VERSION").to_string(),
            schema_version: SCHEMA_VERSION.into(),
            cli_args: cli_args.to_vec(),
            config_digest: config_digest(config)?,
            parallel: config.effective_parallel(),
            parallel_backend: PARALLEL_BACKEND,
            max_purification_rounds: config.max_purification_rounds,
        })
    }

    /// Whether `config` resolves to the configuration recorded here.
    pub fn matches(&self, config: &SweepConfig) -> ReportResult<bool> {
        Ok(config_digest(config)? == self.config_digest)
    }
}

/// Digest of the canonical JSON form of `config`.
///
/// Field order follows the struct definition, so equal configurations hash
/// equally regardless of how their YAML source was laid out.
pub fn config_digest(config: &SweepConfig) -> ReportResult<String> {
    let canonical = serde_json::to_vec(config)?;
    Ok(format!("{:x}", Sha256::digest(&canonical)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrep_core::LengthSweep;

    #[test]
    fn test_capture_reflects_config() {
        let config = SweepConfig {
            lengths: LengthSweep::Values(vec![25.0]),
            max_purification_rounds: 200,
            parallel: false,
            ..SweepConfig::default()
        };
        let args: Vec<String> = vec!["qrep".into(), "sweep".into()];
        let info = ReproducibilityInfo::capture(&config, &args).unwrap();

        assert_eq!(info.schema_version, SCHEMA_VERSION);
        assert_eq!(info.cli_args, args);
        assert_eq!(info.max_purification_rounds, 200);
        assert!(!info.parallel);
        assert_eq!(info.parallel_backend, PARALLEL_BACKEND);
        assert_eq!(info.config_digest.len(), 64);

        let default = ReproducibilityInfo::capture(&SweepConfig::default(), &args).unwrap();
        assert_ne!(info.config_digest, default.config_digest);
        assert_eq!(default.parallel, PARALLEL_BACKEND);
    }

    #[test]
    fn test_digest_tracks_every_field() {
        let base = SweepConfig::default();
        let info = ReproducibilityInfo::capture(&base, &[]).unwrap();
        assert!(info.matches(&base.clone()).unwrap());

        let mut tweaked = base.clone();
        tweaked.noise.pproj = 0.98;
        assert!(!info.matches(&tweaked).unwrap());

        let mut reordered = base;
        reordered.nesting_levels.reverse();
        assert!(!info.matches(&reordered).unwrap());
    }

    #[test]
    fn test_yaml_layout_does_not_change_digest() {
        let a = SweepConfig::from_yaml_str("target_fidelity: 0.95\nparallel: false\n").unwrap();
        let b = SweepConfig::from_yaml_str("parallel: false\ntarget_fidelity: 0.95\n").unwrap();
        assert_eq!(config_digest(&a).unwrap(), config_digest(&b).unwrap());
    }
}

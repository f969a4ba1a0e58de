//! Sweep configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with `QREP_` prefix)
//!
//! Precedence (highest to lowest): environment, file, defaults. The defaults
//! reproduce the classic study: 0.17 dB/km fibre, 10–300 km in 30 steps,
//! nesting levels 1–20, 99 % gates and measurements, target fidelity 0.98.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{QrepError, QrepResult};
use crate::link::{DEFAULT_ATTENUATION_DB_PER_KM, MAX_NESTING_LEVEL};
use crate::noise::{NoiseParameters, check_probability};
use crate::purify::DEFAULT_MAX_ROUNDS;

/// Every variable [`SweepConfig::apply_env`] reads.
pub const ENV_OVERRIDES: &[&str] = &[
    "QREP_ATTENUATION",
    "QREP_TARGET_FIDELITY",
    "QREP_P1",
    "QREP_P2",
    "QREP_PPROJ",
    "QREP_MAX_ROUNDS",
    "QREP_PARALLEL",
];

/// Ordered list of link lengths to evaluate, in km.
///
/// Either an evenly spaced range (endpoints included) or explicit values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LengthSweep {
    /// `count` evenly spaced points from `start` to `stop` inclusive.
    Linspace {
        /// First length.
        start: f64,
        /// Last length.
        stop: f64,
        /// Number of points.
        count: usize,
    },
    /// Explicit lengths, evaluated in the given order.
    Values(Vec<f64>),
}

impl LengthSweep {
    /// Materialise the sweep.
    pub fn lengths(&self) -> Vec<f64> {
        match self {
            Self::Values(values) => values.clone(),
            Self::Linspace { start, stop, count } => match *count {
                0 => Vec::new(),
                1 => vec![*start],
                n => {
                    let step = (stop - start) / (n - 1) as f64;
                    (0..n).map(|i| start + step * i as f64).collect()
                }
            },
        }
    }
}

impl Default for LengthSweep {
    fn default() -> Self {
        Self::Linspace {
            start: 10.0,
            stop: 300.0,
            count: 30,
        }
    }
}

/// Everything a sweep needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Fibre attenuation in dB/km.
    #[serde(default = "default_attenuation")]
    pub attenuation_db_per_km: f64,

    /// Link lengths to evaluate.
    #[serde(default)]
    pub lengths: LengthSweep,

    /// Candidate nesting levels, in evaluation order.
    #[serde(default = "default_nesting_levels")]
    pub nesting_levels: Vec<u32>,

    /// Gate and measurement quality.
    #[serde(default)]
    pub noise: NoiseParameters,

    /// Minimum end-to-end fidelity.
    #[serde(default = "default_target_fidelity")]
    pub target_fidelity: f64,

    /// Round cap of every purification loop.
    #[serde(default = "default_max_rounds")]
    pub max_purification_rounds: u32,

    /// Evaluate trials on the rayon pool (needs the `parallel` feature).
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_attenuation() -> f64 {
    DEFAULT_ATTENUATION_DB_PER_KM
}

fn default_nesting_levels() -> Vec<u32> {
    (1..=20).collect()
}

fn default_target_fidelity() -> f64 {
    0.98
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

fn default_true() -> bool {
    true
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            attenuation_db_per_km: default_attenuation(),
            lengths: LengthSweep::default(),
            nesting_levels: default_nesting_levels(),
            noise: NoiseParameters::default(),
            target_fidelity: default_target_fidelity(),
            max_purification_rounds: default_max_rounds(),
            parallel: default_true(),
        }
    }
}

impl SweepConfig {
    /// Load and validate a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> QrepResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| QrepError::Io(format!("failed to read {}: {e}", path.display())))?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(contents: &str) -> QrepResult<Self> {
        let config: Self =
            serde_yaml_ng::from_str(contents).map_err(|e| QrepError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> QrepResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| QrepError::Parse(e.to_string()))
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Override fields from `QREP_*` variables obtained through `lookup`.
    ///
    /// The recognised names are listed in [`ENV_OVERRIDES`]. Unparsable values are logged and ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(
            lookup: &dyn Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            let raw = lookup(key)?;
            match raw.trim().parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(key, value = %raw, "ignoring unparsable environment override");
                    None
                }
            }
        }

        if let Some(v) = parsed(&lookup, "QREP_ATTENUATION") {
            self.attenuation_db_per_km = v;
        }
        if let Some(v) = parsed(&lookup, "QREP_TARGET_FIDELITY") {
            self.target_fidelity = v;
        }
        if let Some(v) = parsed(&lookup, "QREP_P1") {
            self.noise.p1 = v;
        }
        if let Some(v) = parsed(&lookup, "QREP_P2") {
            self.noise.p2 = v;
        }
        if let Some(v) = parsed(&lookup, "QREP_PPROJ") {
            self.noise.pproj = v;
        }
        if let Some(v) = parsed(&lookup, "QREP_MAX_ROUNDS") {
            self.max_purification_rounds = v;
        }
        if let Some(v) = parsed(&lookup, "QREP_PARALLEL") {
            self.parallel = v;
        }
    }

    /// Whether trials will actually run on the rayon pool: requested here
    /// and compiled in.
    pub fn effective_parallel(&self) -> bool {
        self.parallel && crate::sweep::PARALLEL_BACKEND
    }

    /// Check the configuration for consistency.
    pub fn validate(&self) -> QrepResult<()> {
        if !self.attenuation_db_per_km.is_finite() || self.attenuation_db_per_km < 0.0 {
            return Err(QrepError::InvalidConfig(format!(
                "attenuation must be a non-negative finite number of dB/km, got {}",
                self.attenuation_db_per_km
            )));
        }

        let lengths = self.lengths.lengths();
        if lengths.is_empty() {
            return Err(QrepError::InvalidConfig("length sweep is empty".into()));
        }
        if let Some(&bad) = lengths.iter().find(|l| !l.is_finite() || **l < 0.0) {
            return Err(QrepError::InvalidLength(bad));
        }

        if self.nesting_levels.is_empty() {
            return Err(QrepError::InvalidConfig("nesting level sweep is empty".into()));
        }
        if let Some(&bad) = self
            .nesting_levels
            .iter()
            .find(|n| **n == 0 || **n > MAX_NESTING_LEVEL)
        {
            return Err(QrepError::InvalidNestingLevel(bad));
        }

        self.noise.validate()?;
        check_probability("target_fidelity", self.target_fidelity)?;
        if self.target_fidelity == 0.0 {
            return Err(QrepError::InvalidConfig(
                "target fidelity must be greater than 0".into(),
            ));
        }

        if self.max_purification_rounds == 0 {
            return Err(QrepError::InvalidConfig(
                "max_purification_rounds must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_linspace_is_ten_km_grid() {
        let lengths = LengthSweep::default().lengths();
        assert_eq!(lengths.len(), 30);
        assert_eq!(lengths[0], 10.0);
        assert!((lengths[1] - 20.0).abs() < 1e-9);
        assert!((lengths[29] - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_linspace_edge_counts() {
        let one = LengthSweep::Linspace {
            start: 5.0,
            stop: 50.0,
            count: 1,
        };
        assert_eq!(one.lengths(), vec![5.0]);
        let none = LengthSweep::Linspace {
            start: 5.0,
            stop: 50.0,
            count: 0,
        };
        assert!(none.lengths().is_empty());
    }

    #[test]
    fn test_default_is_valid() {
        let config = SweepConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.nesting_levels.len(), 20);
        assert_eq!(config.max_purification_rounds, 1000);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SweepConfig::default();
        config.apply_env(|key| match key {
            "QREP_TARGET_FIDELITY" => Some("0.95".into()),
            "QREP_P2" => Some(" 0.97 ".into()),
            "QREP_MAX_ROUNDS" => Some("not-a-number".into()),
            "QREP_PARALLEL" => Some("false".into()),
            _ => None,
        });
        assert_eq!(config.target_fidelity, 0.95);
        assert_eq!(config.noise.p2, 0.97);
        assert_eq!(config.max_purification_rounds, 1000);
        assert!(!config.parallel);
    }

    #[test]
    fn test_env_overrides_list_is_complete() {
        let seen = std::cell::RefCell::new(Vec::new());
        SweepConfig::default().apply_env(|key| {
            seen.borrow_mut().push(key.to_string());
            None
        });
        assert_eq!(seen.into_inner(), ENV_OVERRIDES);
    }
}

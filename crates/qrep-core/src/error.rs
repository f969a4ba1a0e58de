//! Error types for the core crate.

use thiserror::Error;

/// Errors produced while building or validating a repeater model.
///
/// Convergence failures of the purification loop are not errors: they are
/// reported through [`crate::purify::PurificationOutcome`] and
/// [`crate::nesting::TrialOutcome`] so a sweep can keep going.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QrepError {
    /// The four Bell-diagonal coefficients do not sum to one.
    #[error("Bell-diagonal coefficients must sum to 1, got {sum}")]
    CoefficientSum {
        /// The offending sum A + B + C + D.
        sum: f64,
    },

    /// A Bell-diagonal coefficient is negative or not a finite number.
    #[error("Bell-diagonal coefficient {name} must be a non-negative finite number, got {value}")]
    InvalidCoefficient {
        /// Coefficient label (A, B, C or D).
        name: &'static str,
        /// The offending value.
        value: f64,
    },

    /// A noise probability lies outside [0, 1].
    #[error("probability {name} must lie in [0, 1], got {value}")]
    InvalidProbability {
        /// Parameter name (p1, p2, pproj, ...).
        name: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Nesting level outside the supported range.
    #[error("nesting level must be in 1..=63, got {0}")]
    InvalidNestingLevel(u32),

    /// Link length is negative or not finite.
    #[error("link length must be a non-negative finite number of km, got {0}")]
    InvalidLength(f64),

    /// Sweep configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// A configuration file could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type for core operations.
pub type QrepResult<T> = Result<T, QrepError>;

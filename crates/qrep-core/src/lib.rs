//! `qrep-core`: resource estimation for nested quantum repeaters.
//!
//! Given a fibre link, a noise model and a target fidelity, estimates how
//! many elementary entangled pairs a nested entanglement-swapping repeater
//! consumes per delivered end-to-end pair, and which nesting level is
//! cheapest:
//!
//! - [`bell`]: closed-form purification and connection maps on
//!   Bell-diagonal states
//! - [`purify`]: iterated purification up to the target fidelity
//! - [`nesting`]: one (length, nesting level) trial
//! - [`sweep`]: the length × nesting-level search
//!
//! # Quick start
//!
//! ```rust
//! use qrep_core::{DistanceSweep, LengthSweep, SweepConfig};
//!
//! let config = SweepConfig {
//!     lengths: LengthSweep::Values(vec![10.0, 50.0]),
//!     nesting_levels: (1..=6).collect(),
//!     ..SweepConfig::default()
//! };
//! let report = DistanceSweep::new(config).unwrap().run();
//! for record in report.series() {
//!     println!("{} km: level {}, {:.1} pairs", record.length_km, record.nesting_level, record.cost);
//! }
//! ```

pub mod bell;
pub mod config;
pub mod error;
pub mod link;
pub mod nesting;
pub mod noise;
pub mod purify;
pub mod sweep;

pub use bell::BellDiagonalState;
pub use config::{LengthSweep, SweepConfig};
pub use error::{QrepError, QrepResult};
pub use link::LinkConfiguration;
pub use nesting::{LevelStep, NestingLevelSimulator, TrialOutcome, TrialReport};
pub use noise::NoiseParameters;
pub use purify::{DivergenceReason, PurificationLoop, PurificationOutcome};
pub use sweep::{DistanceSweep, LengthSelection, ResourceRecord, SweepReport, select_minimum};

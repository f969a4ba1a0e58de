//! qrep report rendering
//!
//! Turns the series selected by a [`qrep_core::DistanceSweep`] into files:
//!
//! - **CSV**: the literal `Expenditure,Distance` header and one row per
//!   reachable length, optionally with the selected nesting level;
//! - **JSON**: a versioned [`SweepDocument`] carrying the configuration, the
//!   series, unreachable lengths and reproducibility metadata.
//!
//! # Example
//!
//! ```no_run
//! use qrep_core::{DistanceSweep, SweepConfig};
//! use qrep_report::{ExportConfig, ReportEmitter};
//!
//! let config = SweepConfig::default();
//! let report = DistanceSweep::new(config.clone())?.run();
//!
//! ReportEmitter::new(ExportConfig::default())
//!     .csv("series.csv")
//!     .json("report.json")
//!     .emit(&config, &report, &[])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod emitter;
pub mod error;
pub mod export;
pub mod report;
pub mod reproducibility;

pub use emitter::ReportEmitter;
pub use error::{ReportError, ReportResult};
pub use export::ExportConfig;
pub use report::{SCHEMA_VERSION, SweepDocument};
pub use reproducibility::ReproducibilityInfo;

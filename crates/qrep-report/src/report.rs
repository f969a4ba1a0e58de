//! Sweep report document.
//!
//! The top-level JSON document combining the configuration, the selected
//! series and reproducibility metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use qrep_core::{LengthSelection, ResourceRecord, SweepConfig, SweepReport};

use crate::error::ReportResult;
use crate::reproducibility::ReproducibilityInfo;

/// Version of the JSON document layout.
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Complete sweep report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepDocument {
    /// Schema version for forward compatibility.
    pub schema_version: String,
    /// Timestamp of the run.
    pub timestamp: DateTime<Utc>,
    /// Configuration the sweep ran with.
    pub config: SweepConfig,
    /// Cheapest feasible record per reachable length, in sweep order.
    pub series: Vec<ResourceRecord>,
    /// Lengths where no nesting level reached the target fidelity.
    pub unreachable_lengths: Vec<f64>,
    /// Per-length detail, only present when requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selections: Vec<LengthSelection>,
    /// Reproducibility information.
    pub reproducibility: ReproducibilityInfo,
}

impl SweepDocument {
    /// Build a document from a finished sweep.
    pub fn new(
        config: &SweepConfig,
        report: &SweepReport,
        cli_args: &[String],
    ) -> ReportResult<Self> {
        Ok(Self {
            schema_version: SCHEMA_VERSION.into(),
            timestamp: Utc::now(),
            config: config.clone(),
            series: report.series(),
            unreachable_lengths: report.unreachable_lengths(),
            selections: Vec::new(),
            reproducibility: ReproducibilityInfo::capture(config, cli_args)?,
        })
    }

    /// Keep every candidate and infeasible level in the document.
    pub fn with_selections(mut self, report: &SweepReport) -> Self {
        self.selections = report.selections.clone();
        self
    }
}

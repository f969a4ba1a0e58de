//! Report emitter: turns a finished sweep into files on disk.

use std::path::{Path, PathBuf};

use tracing::info;

use qrep_core::{SweepConfig, SweepReport};

use crate::error::ReportResult;
use crate::export::{self, ExportConfig};
use crate::report::SweepDocument;

/// Writes the selected series to CSV and/or JSON.
#[derive(Debug, Clone, Default)]
pub struct ReportEmitter {
    export: ExportConfig,
    csv_path: Option<PathBuf>,
    json_path: Option<PathBuf>,
    include_selections: bool,
}

impl ReportEmitter {
    /// Emitter with the given export settings and no outputs.
    pub fn new(export: ExportConfig) -> Self {
        Self {
            export,
            ..Default::default()
        }
    }

    /// Write the series as CSV to `path`.
    pub fn csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.csv_path = Some(path.into());
        self
    }

    /// Write the full document as JSON to `path`.
    pub fn json(mut self, path: impl Into<PathBuf>) -> Self {
        self.json_path = Some(path.into());
        self
    }

    /// Include per-length candidates in the JSON document.
    pub fn include_selections(mut self, yes: bool) -> Self {
        self.include_selections = yes;
        self
    }

    /// Whether any output is configured.
    pub fn has_outputs(&self) -> bool {
        self.csv_path.is_some() || self.json_path.is_some()
    }

    /// Build the JSON document for a sweep.
    pub fn document(
        &self,
        config: &SweepConfig,
        report: &SweepReport,
        cli_args: &[String],
    ) -> ReportResult<SweepDocument> {
        let doc = SweepDocument::new(config, report, cli_args)?;
        Ok(if self.include_selections {
            doc.with_selections(report)
        } else {
            doc
        })
    }

    /// Write every configured output. Returns the paths written.
    pub fn emit(
        &self,
        config: &SweepConfig,
        report: &SweepReport,
        cli_args: &[String],
    ) -> ReportResult<Vec<PathBuf>> {
        let mut written = Vec::new();

        if let Some(path) = &self.csv_path {
            let series = report.series();
            export::csv_to_file(&series, path, &self.export)?;
            info!("Wrote {} rows to {}", series.len(), path.display());
            written.push(path.clone());
        }

        if let Some(path) = &self.json_path {
            let doc = self.document(config, report, cli_args)?;
            export::to_file(&doc, path, &self.export)?;
            info!("Wrote report to {}", path.display());
            written.push(path.clone());
        }

        Ok(written)
    }

    /// Path of the CSV output, if any.
    pub fn csv_path(&self) -> Option<&Path> {
        self.csv_path.as_deref()
    }

    /// Path of the JSON output, if any.
    pub fn json_path(&self) -> Option<&Path> {
        self.json_path.as_deref()
    }
}

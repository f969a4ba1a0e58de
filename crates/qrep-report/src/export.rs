//! Export Module: CSV series and JSON documents.
//!
//! The CSV layout follows the published data files: a literal header line
//! followed by one `cost,length` row per reachable length, optionally with
//! the selected nesting level as a third column.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use qrep_core::ResourceRecord;

use crate::error::{ReportError, ReportResult};
use crate::report::SweepDocument;

/// First CSV column: expected elementary pairs per delivered pair.
pub const CSV_COST_COLUMN: &str = "Expenditure";

/// Second CSV column: link length in km.
pub const CSV_DISTANCE_COLUMN: &str = "Distance";

/// Extra header column written when the nesting level is included.
pub const CSV_LEVEL_COLUMN: &str = "OPM Nesting Level";

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Whether to pretty-print JSON output.
    pub pretty: bool,
    /// Whether the CSV carries the selected nesting level.
    pub with_level: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            with_level: false,
        }
    }
}

fn header(config: &ExportConfig) -> Vec<&'static str> {
    if config.with_level {
        vec![CSV_COST_COLUMN, CSV_DISTANCE_COLUMN, CSV_LEVEL_COLUMN]
    } else {
        vec![CSV_COST_COLUMN, CSV_DISTANCE_COLUMN]
    }
}

fn write_records<W: Write>(
    wtr: &mut csv::Writer<W>,
    series: &[ResourceRecord],
    config: &ExportConfig,
) -> ReportResult<()> {
    wtr.write_record(header(config))?;
    for record in series {
        let mut row = vec![record.cost.to_string(), record.length_km.to_string()];
        if config.with_level {
            row.push(record.nesting_level.to_string());
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the series as CSV to any writer.
pub fn write_csv<W: Write>(
    series: &[ResourceRecord],
    config: &ExportConfig,
    out: W,
) -> ReportResult<()> {
    let mut wtr = csv::Writer::from_writer(out);
    write_records(&mut wtr, series, config)
}

/// Render the series as a CSV string.
pub fn to_csv(series: &[ResourceRecord], config: &ExportConfig) -> ReportResult<String> {
    let mut buf = Vec::new();
    write_csv(series, config, &mut buf)?;
    String::from_utf8(buf).map_err(|e| ReportError::Export(e.to_string()))
}

/// Write the series to a CSV file.
pub fn csv_to_file(
    series: &[ResourceRecord],
    path: &Path,
    config: &ExportConfig,
) -> ReportResult<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| {
        ReportError::Io(format!("Failed to create {}: {}", path.display(), e))
    })?;
    write_records(&mut wtr, series, config)
}

/// Export a sweep document to a JSON string.
pub fn to_json(document: &SweepDocument, config: &ExportConfig) -> ReportResult<String> {
    if config.pretty {
        serde_json::to_string_pretty(document).map_err(ReportError::from)
    } else {
        serde_json::to_string(document).map_err(ReportError::from)
    }
}

/// Export a sweep document to a JSON file.
pub fn to_file(document: &SweepDocument, path: &Path, config: &ExportConfig) -> ReportResult<()> {
    let json = to_json(document, config)?;
    std::fs::write(path, json).map_err(|e| {
        ReportError::Io(format!("Failed to write {}: {}", path.display(), e))
    })
}

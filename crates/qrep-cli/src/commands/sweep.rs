//! Sweep command implementation.
//!
//! `qrep sweep [--config <file>] [--csv <file>] [--json <file>] [--with-level]`

use anyhow::{Context, Result};
use console::style;

use qrep_core::DistanceSweep;
use qrep_report::{ExportConfig, ReportEmitter, export};

use super::common::{format_cost, length_progress_bar, load_config};

/// Options of the sweep command.
#[derive(Debug, Default)]
pub struct SweepOptions<'a> {
    pub config: Option<&'a str>,
    pub csv: Option<&'a str>,
    pub json: Option<&'a str>,
    pub with_level: bool,
    pub detailed: bool,
    pub compact: bool,
    pub sequential: bool,
    pub target_fidelity: Option<f64>,
    pub quiet: bool,
}

/// Execute the sweep command.
pub fn execute(opts: &SweepOptions<'_>) -> Result<()> {
    let mut config = load_config(opts.config)?;
    if let Some(target) = opts.target_fidelity {
        config.target_fidelity = target;
    }
    if opts.sequential {
        config.parallel = false;
    }

    let sweep = DistanceSweep::new(config).context("Invalid sweep configuration")?;
    let lengths = sweep.config().lengths.lengths();

    eprintln!(
        "{} Sweeping {} lengths x {} nesting levels (target F = {})",
        style("→").cyan().bold(),
        lengths.len(),
        sweep.config().nesting_levels.len(),
        sweep.config().target_fidelity,
    );

    let pb = if opts.quiet {
        indicatif::ProgressBar::hidden()
    } else {
        length_progress_bar(lengths.len() as u64)?
    };
    let report = sweep.run_with_progress(|_| pb.inc(1));
    pb.finish_and_clear();

    let export_config = ExportConfig {
        pretty: !opts.compact,
        with_level: opts.with_level,
    };
    let mut emitter = ReportEmitter::new(export_config.clone()).include_selections(opts.detailed);
    if let Some(path) = opts.csv {
        emitter = emitter.csv(path);
    }
    if let Some(path) = opts.json {
        emitter = emitter.json(path);
    }

    let cli_args: Vec<String> = std::env::args().collect();
    if emitter.has_outputs() {
        for path in emitter.emit(sweep.config(), &report, &cli_args)? {
            eprintln!(
                "{} Written to {}",
                style("OK").green().bold(),
                path.display()
            );
        }
    } else {
        print!("{}", export::to_csv(&report.series(), &export_config)?);
    }

    // Summary to stderr
    eprintln!();
    eprintln!("{}", style("Sweep Summary").bold().underlined());
    for selection in &report.selections {
        match selection.selected {
            Some(record) => eprintln!(
                "  {:>8.2} km  n = {:<3} {:>14} pairs",
                selection.length_km,
                record.nesting_level,
                style(format_cost(record.cost)).yellow(),
            ),
            None => eprintln!(
                "  {:>8.2} km  {}",
                selection.length_km,
                style("unreachable").red(),
            ),
        }
    }

    let unreachable = report.unreachable_lengths();
    if !unreachable.is_empty() {
        eprintln!();
        eprintln!(
            "{} {} length(s) cannot reach F = {} with the given nesting levels",
            style("!").yellow().bold(),
            unreachable.len(),
            sweep.config().target_fidelity,
        );
    }

    Ok(())
}

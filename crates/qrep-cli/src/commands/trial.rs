//! Trial command implementation.
//!
//! `qrep trial --length <km> --level <n> [--config <file>] [--json]`
//!
//! Simulates one link and prints the per-level breakdown.

use anyhow::{Context, Result};
use console::style;

use qrep_core::{DistanceSweep, TrialOutcome};

use super::common::{format_cost, load_config};

/// Execute the trial command.
pub fn execute(config_path: Option<&str>, length_km: f64, level: u32, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let sweep = DistanceSweep::new(config)?;
    let report = sweep
        .trial(length_km, level)
        .with_context(|| format!("Cannot simulate {length_km} km at nesting level {level}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} km, nesting level {} ({} hops of {:.3} km)",
        style("Link").bold(),
        report.link.length_km(),
        report.link.nesting_level(),
        report.link.sub_links(),
        report.link.sub_link_km(),
    );
    println!(
        "  Elementary pair: F = {:.6} (transmissivity {:.6})",
        report.elementary_pair.fidelity(),
        report.link.transmissivity(),
    );
    println!();
    println!(
        "  {:>5}  {:>10}  {:>7}  {:>12}  {:>9}",
        "level", "segments", "rounds", "multiplier", "fidelity"
    );
    for step in &report.levels {
        println!(
            "  {:>5}  {:>10}  {:>7}  {:>12}  {:>9.6}",
            step.level,
            step.segments,
            step.purification_rounds,
            format_cost(step.multiplier),
            step.fidelity,
        );
    }
    println!();

    match &report.outcome {
        TrialOutcome::Feasible { cost, final_state } => {
            println!(
                "{} {} elementary pairs per delivered pair, final F = {:.6}",
                style("✓").green().bold(),
                style(format_cost(*cost)).yellow(),
                final_state.fidelity(),
            );
        }
        TrialOutcome::Infeasible {
            failed_level,
            reason,
            ..
        } => {
            println!(
                "{} Infeasible: purification failed at level {} ({:?}), legacy cost {}",
                style("✗").red().bold(),
                failed_level,
                reason,
                report.outcome.legacy_cost(),
            );
        }
    }

    Ok(())
}

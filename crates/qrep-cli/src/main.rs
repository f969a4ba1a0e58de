//! qrep command-line interface
//!
//! Estimates how many elementary Bell pairs a nested entanglement-purifying
//! quantum repeater consumes per delivered end-to-end pair, and which
//! nesting level is cheapest at each link length.
//!
//! ```text
//! qrep sweep --csv series.csv --json report.json
//! qrep trial --length 100 --level 6
//! qrep config > qrep.yaml
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::sweep::SweepOptions;
use commands::{config, sweep, trial};

/// qrep - resource estimates for nested quantum repeaters
#[derive(Parser)]
#[command(name = "qrep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the cheapest nesting level for every link length
    Sweep {
        /// YAML configuration file
        #[arg(short, long, env = "QREP_CONFIG")]
        config: Option<String>,

        /// Write the selected series as CSV (stdout if no output is given)
        #[arg(long)]
        csv: Option<String>,

        /// Write the full JSON report
        #[arg(long)]
        json: Option<String>,

        /// Add the selected nesting level as a third CSV column
        #[arg(long)]
        with_level: bool,

        /// Include every candidate level in the JSON report
        #[arg(long)]
        detailed: bool,

        /// Compact (single-line) JSON
        #[arg(long)]
        compact: bool,

        /// Evaluate trials on the current thread only
        #[arg(long)]
        sequential: bool,

        /// Override the target end-to-end fidelity
        #[arg(short, long)]
        target_fidelity: Option<f64>,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Simulate a single link at one nesting level
    Trial {
        /// Link length in km
        #[arg(short, long)]
        length: f64,

        /// Nesting level (hops = 2^level)
        #[arg(short = 'n', long)]
        level: u32,

        /// YAML configuration file
        #[arg(short, long, env = "QREP_CONFIG")]
        config: Option<String>,

        /// Print the trial report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as YAML
    Config {
        /// YAML configuration file to merge over the defaults
        #[arg(short, long, env = "QREP_CONFIG")]
        config: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Sweep {
            config,
            csv,
            json,
            with_level,
            detailed,
            compact,
            sequential,
            target_fidelity,
            quiet,
        } => sweep::execute(&SweepOptions {
            config: config.as_deref(),
            csv: csv.as_deref(),
            json: json.as_deref(),
            with_level,
            detailed,
            compact,
            sequential,
            target_fidelity,
            quiet,
        }),

        Commands::Trial {
            length,
            level,
            config,
            json,
        } => trial::execute(config.as_deref(), length, level, json),

        Commands::Config {
            config: config_path,
        } => config::execute(config_path.as_deref()),
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

//! Distance / nesting-level search.
//!
//! For every length in the sweep, every candidate nesting level is simulated
//! and the cheapest feasible one is kept. Lengths are reported in sweep
//! order; ties between levels go to the one evaluated first.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SweepConfig;
use crate::error::QrepResult;
use crate::link::LinkConfiguration;
use crate::nesting::{NestingLevelSimulator, TrialReport};

/// Whether this build carries the rayon backend.
pub const PARALLEL_BACKEND: bool = cfg!(feature = "parallel");

/// Expected cost of one (length, nesting level) point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Expected elementary pairs per delivered pair.
    pub cost: f64,
    /// Link length in km.
    pub length_km: f64,
    /// Nesting level.
    pub nesting_level: u32,
}

impl ResourceRecord {
    /// A record is feasible when its cost is a positive finite number.
    pub fn is_feasible(&self) -> bool {
        self.cost.is_finite() && self.cost > 0.0
    }
}

/// Pick the feasible record with the smallest cost.
///
/// Records with a non-positive cost are ignored. On ties the earliest record
/// wins. Returns `None` when nothing is feasible.
pub fn select_minimum(records: &[ResourceRecord]) -> Option<&ResourceRecord> {
    records
        .iter()
        .filter(|r| r.is_feasible())
        .fold(None, |best: Option<&ResourceRecord>, r| match best {
            Some(b) if b.cost <= r.cost => Some(b),
            _ => Some(r),
        })
}

/// Result of sweeping every nesting level at one length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthSelection {
    /// Link length in km.
    pub length_km: f64,
    /// Cheapest feasible record, `None` if no level reaches the target.
    pub selected: Option<ResourceRecord>,
    /// Every feasible record, in nesting-level sweep order.
    pub candidates: Vec<ResourceRecord>,
    /// Levels whose purification failed.
    pub infeasible_levels: Vec<u32>,
}

/// Result of a whole sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// One entry per length, in sweep order.
    pub selections: Vec<LengthSelection>,
}

impl SweepReport {
    /// The selected records, one per reachable length, in sweep order.
    pub fn series(&self) -> Vec<ResourceRecord> {
        self.selections.iter().filter_map(|s| s.selected).collect()
    }

    /// Lengths for which no nesting level reaches the target.
    pub fn unreachable_lengths(&self) -> Vec<f64> {
        self.selections
            .iter()
            .filter(|s| s.selected.is_none())
            .map(|s| s.length_km)
            .collect()
    }
}

/// Runs the two-level search described by a [`SweepConfig`].
#[derive(Debug, Clone)]
pub struct DistanceSweep {
    config: SweepConfig,
    simulator: NestingLevelSimulator,
}

impl DistanceSweep {
    /// Validate `config` and prepare the simulator.
    pub fn new(config: SweepConfig) -> QrepResult<Self> {
        config.validate()?;
        let simulator = NestingLevelSimulator::new(config.noise, config.target_fidelity)
            .with_max_rounds(config.max_purification_rounds);
        Ok(Self { config, simulator })
    }

    /// The configuration in use.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Simulate a single (length, level) point with this sweep's physics.
    pub fn trial(&self, length_km: f64, nesting_level: u32) -> QrepResult<TrialReport> {
        let link = LinkConfiguration::new(
            length_km,
            self.config.attenuation_db_per_km,
            nesting_level,
        )?;
        Ok(self.simulator.simulate(&link))
    }

    /// Run the whole sweep.
    pub fn run(&self) -> SweepReport {
        self.run_with_progress(|_| {})
    }

    /// Run the whole sweep, calling `on_length` as each length finishes.
    ///
    /// With parallel evaluation enabled the callback may run on worker
    /// threads and in any order; the returned report is always in sweep
    /// order.
    pub fn run_with_progress<F>(&self, on_length: F) -> SweepReport
    where
        F: Fn(&LengthSelection) + Sync,
    {
        let lengths = self.config.lengths.lengths();
        info!(
            lengths = lengths.len(),
            levels = self.config.nesting_levels.len(),
            target_fidelity = self.config.target_fidelity,
            parallel = self.parallel(),
            "starting distance sweep"
        );

        let selections = self.map_ordered(&lengths, |&length_km| {
            let selection = self.evaluate_length(length_km);
            on_length(&selection);
            selection
        });

        let report = SweepReport { selections };
        info!(
            selected = report.series().len(),
            unreachable = report.unreachable_lengths().len(),
            "distance sweep finished"
        );
        report
    }

    /// Sweep every nesting level at one length and pick the cheapest.
    pub fn evaluate_length(&self, length_km: f64) -> LengthSelection {
        let outcomes = self.map_ordered(&self.config.nesting_levels, |&nesting_level| {
            let cost = LinkConfiguration::new(
                length_km,
                self.config.attenuation_db_per_km,
                nesting_level,
            )
            .ok()
            .and_then(|link| self.simulator.simulate(&link).outcome.cost());
            (nesting_level, cost)
        });

        let mut candidates = Vec::new();
        let mut infeasible_levels = Vec::new();
        for (nesting_level, cost) in outcomes {
            match cost {
                Some(cost) if cost > 0.0 => candidates.push(ResourceRecord {
                    cost,
                    length_km,
                    nesting_level,
                }),
                _ => infeasible_levels.push(nesting_level),
            }
        }

        let selected = select_minimum(&candidates).copied();
        match selected {
            Some(record) => debug!(
                length_km,
                nesting_level = record.nesting_level,
                cost = record.cost,
                "selected nesting level"
            ),
            None => warn!(length_km, "no nesting level reaches the target fidelity"),
        }

        LengthSelection {
            length_km,
            selected,
            candidates,
            infeasible_levels,
        }
    }

    fn parallel(&self) -> bool {
        self.config.effective_parallel()
    }

    /// Map over `items`, on the rayon pool when enabled, preserving order.
    fn map_ordered<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        if self.config.parallel {
            use rayon::prelude::*;
            return items.par_iter().map(f).collect();
        }
        items.iter().map(f).collect()
    }
}

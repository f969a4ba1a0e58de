//! Nested repeater simulation for a single (length, nesting level) point.
//!
//! The link is halved `n` times. Starting from the elementary pair, each
//! level `j = 0 … n−1` connects two adjacent segments and, if the joined
//! pair falls short of the target fidelity, purifies it back up. A level
//! operates on `2^(n−1−j)` segments, so the expected pair count is
//!
//!   AP = Σ_j 2^(n−1−j) · G_j
//!
//! where `G_j` is 2 when the connected pair already beats the target and the
//! purification multiplier otherwise.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bell::{self, BellDiagonalState};
use crate::link::LinkConfiguration;
use crate::noise::NoiseParameters;
use crate::purify::{
    DEFAULT_MAX_ROUNDS, DivergenceReason, LEGACY_FAILURE_MULTIPLIER, PurificationLoop,
    PurificationOutcome,
};

/// Multiplier charged for a level that needs no purification.
pub const CONNECTION_ONLY_MULTIPLIER: f64 = 2.0;

/// What happened at one level of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelStep {
    /// Level index `j`, counted from the elementary links upwards.
    pub level: u32,
    /// Segments this level operates over, `2^(n−1−j)`.
    pub segments: u64,
    /// Cost multiplier `G_j` (only meaningful for completed levels).
    pub multiplier: f64,
    /// Purification rounds spent at this level.
    pub purification_rounds: u32,
    /// Fidelity once the level is done.
    pub fidelity: f64,
}

/// Outcome of one (length, level) trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrialOutcome {
    /// The target fidelity is reachable.
    Feasible {
        /// Expected elementary pairs per delivered pair.
        cost: f64,
        /// End-to-end pair delivered.
        final_state: BellDiagonalState,
    },
    /// Purification failed at some level.
    Infeasible {
        /// Level `j` at which purification gave up.
        failed_level: u32,
        /// Segments of the failed level.
        failed_segments: u64,
        /// Why it gave up.
        reason: DivergenceReason,
        /// Cost accumulated by the completed levels.
        partial_cost: f64,
    },
}

impl TrialOutcome {
    /// Cost of a feasible trial.
    pub fn cost(&self) -> Option<f64> {
        match self {
            Self::Feasible { cost, .. } => Some(*cost),
            Self::Infeasible { .. } => None,
        }
    }

    /// True for [`TrialOutcome::Feasible`].
    pub fn is_feasible(&self) -> bool {
        matches!(self, Self::Feasible { .. })
    }

    /// Total cost under the legacy sentinel convention.
    ///
    /// A failed level contributes `segments · (−1000)` on top of the levels
    /// completed before it; the remaining levels are skipped.
    pub fn legacy_cost(&self) -> f64 {
        match self {
            Self::Feasible { cost, .. } => *cost,
            Self::Infeasible {
                failed_segments,
                partial_cost,
                ..
            } => partial_cost + *failed_segments as f64 * LEGACY_FAILURE_MULTIPLIER,
        }
    }
}

/// Full record of one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialReport {
    /// The simulated link.
    pub link: LinkConfiguration,
    /// Elementary pair before any repeater operation.
    pub elementary_pair: BellDiagonalState,
    /// Per-level trace, in processing order.
    pub levels: Vec<LevelStep>,
    /// Overall result.
    pub outcome: TrialOutcome,
}

/// Simulates the repeater hierarchy for one link at a time.
#[derive(Debug, Clone)]
pub struct NestingLevelSimulator {
    noise: NoiseParameters,
    purification: PurificationLoop,
}

impl NestingLevelSimulator {
    /// Create a simulator with the default purification round cap.
    pub fn new(noise: NoiseParameters, target_fidelity: f64) -> Self {
        Self {
            noise,
            purification: PurificationLoop::new(target_fidelity, noise)
                .with_max_rounds(DEFAULT_MAX_ROUNDS),
        }
    }

    /// Override the purification round cap.
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.purification = self.purification.with_max_rounds(max_rounds);
        self
    }

    /// Target fidelity.
    pub fn target_fidelity(&self) -> f64 {
        self.purification.target_fidelity()
    }

    /// Run the hierarchy for `link`.
    pub fn simulate(&self, link: &LinkConfiguration) -> TrialReport {
        let n = link.nesting_level();
        let fmin = self.target_fidelity();
        let elementary_pair = link.elementary_pair();

        let mut state = elementary_pair;
        let mut cost = 0.0;
        let mut levels = Vec::with_capacity(n as usize);

        for j in 0..n {
            let segments = 1u64 << (n - 1 - j);
            state = bell::connect(&state, &self.noise);

            let (multiplier, rounds) = if state.fidelity() > fmin {
                (CONNECTION_ONLY_MULTIPLIER, 0)
            } else {
                match self.purification.run(state) {
                    PurificationOutcome::Converged {
                        state: purified,
                        multiplier,
                        rounds,
                    } => {
                        state = purified;
                        (multiplier, rounds)
                    }
                    PurificationOutcome::Diverged { rounds, reason } => {
                        levels.push(LevelStep {
                            level: j,
                            segments,
                            multiplier: LEGACY_FAILURE_MULTIPLIER,
                            purification_rounds: rounds,
                            fidelity: state.fidelity(),
                        });
                        debug!(
                            length_km = link.length_km(),
                            nesting_level = n,
                            level = j,
                            ?reason,
                            "trial infeasible"
                        );
                        return TrialReport {
                            link: *link,
                            elementary_pair,
                            levels,
                            outcome: TrialOutcome::Infeasible {
                                failed_level: j,
                                failed_segments: segments,
                                reason,
                                partial_cost: cost,
                            },
                        };
                    }
                }
            };

            cost += segments as f64 * multiplier;
            trace!(
                level = j,
                segments,
                multiplier,
                rounds,
                fidelity = state.fidelity(),
                "level complete"
            );
            levels.push(LevelStep {
                level: j,
                segments,
                multiplier,
                purification_rounds: rounds,
                fidelity: state.fidelity(),
            });
        }

        debug!(
            length_km = link.length_km(),
            nesting_level = n,
            cost,
            fidelity = state.fidelity(),
            "trial feasible"
        );
        TrialReport {
            link: *link,
            elementary_pair,
            levels,
            outcome: TrialOutcome::Feasible {
                cost,
                final_state: state,
            },
        }
    }
}

//! Iterated purification towards a target fidelity.
//!
//! Each round consumes two pairs and keeps one with probability `N`, so the
//! expected number of input pairs per surviving output grows by `2 / N` per
//! round. The loop stops once the fidelity reaches the target or a round
//! cap is hit.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::bell::{self, BellDiagonalState};
use crate::noise::NoiseParameters;

/// Default round cap.
pub const DEFAULT_MAX_ROUNDS: u32 = 1000;

/// Multiplier historically reported for a diverged loop.
///
/// The engine never uses it internally; see
/// [`PurificationOutcome::legacy_multiplier`].
pub const LEGACY_FAILURE_MULTIPLIER: f64 = -1000.0;

/// Why a purification loop gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceReason {
    /// The round cap was reached below the target fidelity.
    NonConvergence,
    /// A round had zero (or non-finite) success probability.
    DegenerateSuccessProbability,
}

/// Result of driving one link up to the target fidelity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PurificationOutcome {
    /// Target reached.
    Converged {
        /// Final state, fidelity ≥ target.
        state: BellDiagonalState,
        /// Expected input pairs per output pair, ∏ 2/N.
        multiplier: f64,
        /// Rounds performed.
        rounds: u32,
    },
    /// Target not reachable with this input.
    Diverged {
        /// Rounds performed before giving up.
        rounds: u32,
        /// Failure kind.
        reason: DivergenceReason,
    },
}

impl PurificationOutcome {
    /// True for [`PurificationOutcome::Converged`].
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    /// Rounds performed.
    pub fn rounds(&self) -> u32 {
        match *self {
            Self::Converged { rounds, .. } | Self::Diverged { rounds, .. } => rounds,
        }
    }

    /// Multiplier under the legacy sentinel convention: the real
    /// multiplier on success, [`LEGACY_FAILURE_MULTIPLIER`] otherwise.
    pub fn legacy_multiplier(&self) -> f64 {
        match *self {
            Self::Converged { multiplier, .. } => multiplier,
            Self::Diverged { .. } => LEGACY_FAILURE_MULTIPLIER,
        }
    }
}

/// Purification fixed-point loop.
#[derive(Debug, Clone)]
pub struct PurificationLoop {
    target_fidelity: f64,
    noise: NoiseParameters,
    max_rounds: u32,
}

impl PurificationLoop {
    /// Loop towards `target_fidelity` under `noise`, capped at
    /// [`DEFAULT_MAX_ROUNDS`].
    pub fn new(target_fidelity: f64, noise: NoiseParameters) -> Self {
        Self {
            target_fidelity,
            noise,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Override the round cap.
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Target fidelity.
    pub fn target_fidelity(&self) -> f64 {
        self.target_fidelity
    }

    /// Round cap.
    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Purify `state` until its fidelity reaches the target.
    ///
    /// A state already at or above the target is returned untouched with a
    /// multiplier of 1.
    pub fn run(&self, state: BellDiagonalState) -> PurificationOutcome {
        let mut current = state;
        let mut multiplier = 1.0;
        let mut rounds = 0u32;

        while current.fidelity() < self.target_fidelity {
            if rounds >= self.max_rounds {
                trace!(
                    rounds,
                    fidelity = current.fidelity(),
                    target = self.target_fidelity,
                    "purification did not converge"
                );
                return PurificationOutcome::Diverged {
                    rounds,
                    reason: DivergenceReason::NonConvergence,
                };
            }

            let Some(round) = bell::purify(&current, &current, &self.noise) else {
                trace!(rounds, "purification success probability degenerate");
                return PurificationOutcome::Diverged {
                    rounds,
                    reason: DivergenceReason::DegenerateSuccessProbability,
                };
            };

            multiplier *= 2.0 / round.success_probability;
            current = round.state;
            rounds += 1;
        }

        PurificationOutcome::Converged {
            state: current,
            multiplier,
            rounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_above_target() {
        let lp = PurificationLoop::new(0.9, NoiseParameters::default());
        let outcome = lp.run(BellDiagonalState::werner(0.95));
        assert_eq!(
            outcome,
            PurificationOutcome::Converged {
                state: BellDiagonalState::werner(0.95),
                multiplier: 1.0,
                rounds: 0,
            }
        );
    }

    #[test]
    fn test_zero_cap_diverges_immediately() {
        let lp = PurificationLoop::new(0.99, NoiseParameters::default()).with_max_rounds(0);
        let outcome = lp.run(BellDiagonalState::werner(0.8));
        assert_eq!(outcome.rounds(), 0);
        assert_eq!(outcome.legacy_multiplier(), LEGACY_FAILURE_MULTIPLIER);
    }
}

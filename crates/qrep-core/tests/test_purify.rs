//! Tests for the purification loop.

use qrep_core::bell::purify;
use qrep_core::purify::{DEFAULT_MAX_ROUNDS, LEGACY_FAILURE_MULTIPLIER};
use qrep_core::{
    BellDiagonalState, DivergenceReason, NoiseParameters, PurificationLoop, PurificationOutcome,
};

// ---------------------------------------------------------------------------
// Convergence
// ---------------------------------------------------------------------------

#[test]
fn noiseless_loop_reaches_high_target() {
    let lp = PurificationLoop::new(0.999, NoiseParameters::noiseless());
    match lp.run(BellDiagonalState::werner(0.7)) {
        PurificationOutcome::Converged {
            state,
            multiplier,
            rounds,
        } => {
            assert!(state.fidelity() >= 0.999);
            assert!(rounds > 0 && rounds < DEFAULT_MAX_ROUNDS);
            // Every round costs at least two pairs.
            assert!(multiplier >= 2f64.powi(rounds as i32));
        }
        other => panic!("expected convergence, got {other:?}"),
    }
}

#[test]
fn fidelity_rises_every_round_in_purification_regime() {
    let noise = NoiseParameters::default();
    let target = 0.98;
    for start in [0.55, 0.6, 0.75, 0.9] {
        let mut state = BellDiagonalState::werner(start);
        let mut rounds = 0;
        while state.fidelity() < target {
            let next = purify(&state, &state, &noise).unwrap().state;
            assert!(
                next.fidelity() > state.fidelity(),
                "round {rounds} from {start}: {} -> {}",
                state.fidelity(),
                next.fidelity()
            );
            state = next;
            rounds += 1;
            assert!(rounds < DEFAULT_MAX_ROUNDS, "no progress from {start}");
        }

        let outcome = PurificationLoop::new(target, noise).run(BellDiagonalState::werner(start));
        assert!(outcome.is_converged());
        assert_eq!(outcome.rounds(), rounds);
    }
}

#[test]
fn multiplier_is_product_of_two_over_n() {
    let noise = NoiseParameters::default();
    let start = BellDiagonalState::werner(0.8);

    let mut state = start;
    let mut expected = 1.0;
    for _ in 0..3 {
        let round = purify(&state, &state, &noise).unwrap();
        expected *= 2.0 / round.success_probability;
        state = round.state;
    }

    let lp = PurificationLoop::new(state.fidelity(), noise);
    match lp.run(start) {
        PurificationOutcome::Converged {
            multiplier, rounds, ..
        } => {
            assert_eq!(rounds, 3);
            assert!((multiplier - expected).abs() < 1e-9 * expected);
        }
        other => panic!("expected convergence, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Failure
// ---------------------------------------------------------------------------

#[test]
fn target_above_fixed_point_hits_round_cap() {
    // With 99 % gates the recurrence saturates near 0.986.
    let lp = PurificationLoop::new(0.999, NoiseParameters::default()).with_max_rounds(200);
    let outcome = lp.run(BellDiagonalState::werner(0.9));
    assert_eq!(
        outcome,
        PurificationOutcome::Diverged {
            rounds: 200,
            reason: DivergenceReason::NonConvergence,
        }
    );
    assert_eq!(outcome.legacy_multiplier(), LEGACY_FAILURE_MULTIPLIER);
}

#[test]
fn pair_below_threshold_never_converges() {
    let lp = PurificationLoop::new(0.98, NoiseParameters::default());
    let outcome = lp.run(BellDiagonalState::werner(0.4));
    assert!(!outcome.is_converged());
    assert_eq!(outcome.rounds(), DEFAULT_MAX_ROUNDS);
}

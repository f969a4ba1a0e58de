//! Tests for the distance / nesting-level search.

use qrep_core::{DistanceSweep, LengthSweep, QrepError, SweepConfig};

fn config(lengths: Vec<f64>, levels: std::ops::RangeInclusive<u32>) -> SweepConfig {
    SweepConfig {
        lengths: LengthSweep::Values(lengths),
        nesting_levels: levels.collect(),
        ..SweepConfig::default()
    }
}

#[test]
fn selects_cheapest_level_per_length() {
    let sweep = DistanceSweep::new(config(vec![10.0, 50.0, 100.0], 1..=8)).unwrap();
    let series = sweep.run().series();

    let picked: Vec<(f64, u32)> = series
        .iter()
        .map(|r| (r.length_km, r.nesting_level))
        .collect();
    assert_eq!(picked, vec![(10.0, 3), (50.0, 5), (100.0, 6)]);
    assert!((series[0].cost - 143.026_051_747).abs() < 1e-3);
    assert!((series[1].cost - 640.838_175_203).abs() < 1e-3);
    assert!((series[2].cost - 1_292.323_234_879).abs() < 1e-3);
}

#[test]
fn series_follows_length_order() {
    let sweep = DistanceSweep::new(config(vec![100.0, 10.0, 50.0], 1..=8)).unwrap();
    let lengths: Vec<f64> = sweep.run().series().iter().map(|r| r.length_km).collect();
    assert_eq!(lengths, vec![100.0, 10.0, 50.0]);
}

#[test]
fn infeasible_levels_are_excluded() {
    let sweep = DistanceSweep::new(config(vec![50.0], 1..=5)).unwrap();
    let selection = &sweep.run().selections[0];
    assert_eq!(selection.infeasible_levels, vec![1, 2]);
    let levels: Vec<u32> = selection
        .candidates
        .iter()
        .map(|r| r.nesting_level)
        .collect();
    assert_eq!(levels, vec![3, 4, 5]);
    assert!(selection.candidates.iter().all(|r| r.cost > 0.0));
    assert_eq!(selection.selected.unwrap().nesting_level, 5);
}

#[test]
fn unreachable_length_is_reported_not_fatal() {
    // 300 km with at most two halvings leaves 75 km hops: nothing converges.
    let sweep = DistanceSweep::new(config(vec![10.0, 300.0, 50.0], 1..=3)).unwrap();
    let report = sweep.run();
    assert_eq!(report.selections.len(), 3);
    assert!(report.selections[1].selected.is_none());
    assert!(report.selections[1].candidates.is_empty());
    assert_eq!(report.unreachable_lengths(), vec![300.0]);
    assert_eq!(report.series().len(), 2);
}

#[test]
fn rerun_is_deterministic() {
    let sweep = DistanceSweep::new(config(vec![10.0, 60.0, 120.0], 1..=10)).unwrap();
    assert_eq!(sweep.run(), sweep.run());
}

#[test]
fn parallel_and_sequential_agree() {
    let mut cfg = config(vec![10.0, 40.0, 90.0, 150.0], 1..=10);
    cfg.parallel = true;
    let parallel = DistanceSweep::new(cfg.clone()).unwrap().run();
    cfg.parallel = false;
    let sequential = DistanceSweep::new(cfg).unwrap().run();
    assert_eq!(parallel, sequential);
}

#[test]
fn progress_callback_sees_every_length() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let seen = AtomicUsize::new(0);
    let sweep = DistanceSweep::new(config(vec![10.0, 20.0, 30.0], 1..=4)).unwrap();
    sweep.run_with_progress(|_| {
        seen.fetch_add(1, Ordering::Relaxed);
    });
    assert_eq!(seen.load(Ordering::Relaxed), 3);
}

#[test]
fn trial_uses_sweep_physics() {
    let sweep = DistanceSweep::new(SweepConfig::default()).unwrap();
    let report = sweep.trial(10.0, 3).unwrap();
    assert!((report.outcome.cost().unwrap() - 143.026_051_747).abs() < 1e-3);
    assert!(matches!(
        sweep.trial(10.0, 0),
        Err(QrepError::InvalidNestingLevel(0))
    ));
}

#[test]
fn invalid_config_is_rejected() {
    let mut cfg = SweepConfig::default();
    cfg.nesting_levels.clear();
    assert!(matches!(
        DistanceSweep::new(cfg),
        Err(QrepError::InvalidConfig(_))
    ));

    let cfg = SweepConfig {
        target_fidelity: 1.5,
        ..SweepConfig::default()
    };
    assert!(matches!(
        DistanceSweep::new(cfg),
        Err(QrepError::InvalidProbability {
            name: "target_fidelity",
            ..
        })
    ));
}

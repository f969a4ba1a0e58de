//! Tests for YAML configuration loading.

use std::io::Write;

use qrep_core::{LengthSweep, QrepError, SweepConfig};

#[test]
fn partial_yaml_falls_back_to_defaults() {
    let config = SweepConfig::from_yaml_str("target_fidelity: 0.95\n").unwrap();
    assert_eq!(config.target_fidelity, 0.95);
    assert_eq!(config.attenuation_db_per_km, 0.17);
    assert_eq!(config.lengths, LengthSweep::default());
    assert_eq!(config.nesting_levels, (1..=20).collect::<Vec<_>>());
}

#[test]
fn explicit_length_list_and_linspace_both_parse() {
    let listed = SweepConfig::from_yaml_str("lengths: [25.0, 75.0]\n").unwrap();
    assert_eq!(listed.lengths.lengths(), vec![25.0, 75.0]);

    let spaced =
        SweepConfig::from_yaml_str("lengths:\n  start: 0.0\n  stop: 100.0\n  count: 5\n").unwrap();
    assert_eq!(spaced.lengths.lengths(), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
}

#[test]
fn yaml_roundtrip() {
    let config = SweepConfig {
        nesting_levels: vec![2, 4, 6],
        target_fidelity: 0.9,
        parallel: false,
        ..SweepConfig::default()
    };
    let yaml = config.to_yaml().unwrap();
    assert_eq!(SweepConfig::from_yaml_str(&yaml).unwrap(), config);
}

#[test]
fn invalid_values_are_rejected() {
    assert!(matches!(
        SweepConfig::from_yaml_str("noise: { p1: 0.9, p2: 1.1, pproj: 0.9 }\n"),
        Err(QrepError::InvalidProbability { name: "p2", .. })
    ));
    assert!(matches!(
        SweepConfig::from_yaml_str("nesting_levels: [1, 0]\n"),
        Err(QrepError::InvalidNestingLevel(0))
    ));
    assert!(matches!(
        SweepConfig::from_yaml_str("lengths: [10.0, -5.0]\n"),
        Err(QrepError::InvalidLength(_))
    ));
    assert!(matches!(
        SweepConfig::from_yaml_str("max_purification_rounds: 0\n"),
        Err(QrepError::InvalidConfig(_))
    ));
    assert!(matches!(
        SweepConfig::from_yaml_str("target_fidelity: [oops]\n"),
        Err(QrepError::Parse(_))
    ));
}

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "attenuation_db_per_km: 0.2").unwrap();
    writeln!(file, "lengths: [10.0]").unwrap();
    writeln!(file, "nesting_levels: [1, 2, 3]").unwrap();

    let config = SweepConfig::from_file(file.path()).unwrap();
    assert_eq!(config.attenuation_db_per_km, 0.2);
    assert_eq!(config.nesting_levels, vec![1, 2, 3]);
}

#[test]
fn missing_file_is_io_error() {
    assert!(matches!(
        SweepConfig::from_file("/nonexistent/qrep.yaml"),
        Err(QrepError::Io(_))
    ));
}

//! Integration test: configuration files drive the controller.

use lift_common::config::{ConfigError, LiftConfig};
use std::io::Write;
use std::path::Path;

use super::{LIFT_TOML, home, lift};

#[test]
fn shipped_config_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/lift.toml");
    let config = LiftConfig::load_validated(&path).unwrap();
    assert_eq!(config.axis.units().steps_per_mm(), 200.0);
    assert_eq!(config.axis.pins.probe, 18);
}

#[test]
fn config_file_to_homed_lift() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "{LIFT_TOML}\n[cycle]\ncycle_time_us = 500\n"
    )
    .unwrap();

    let config = LiftConfig::load_validated(file.path()).unwrap();
    assert_eq!(config.cycle.cycle_time_us, 500);
    let (mut runner, sim) = lift(&config);
    home(&mut runner);
    assert!(runner.controller().is_homed());
    assert_eq!(sim.carriage_steps(), 0);
}

#[test]
fn invalid_travel_rejected() {
    let toml = format!("{LIFT_TOML}\n[axis.travel]\nbackoff_distance = 200.0\n");
    assert!(matches!(
        LiftConfig::from_toml_str(&toml),
        Err(ConfigError::ValidationError(_))
    ));
}

//! Shared fixtures for the integration tests.

mod commands;
mod config;
mod homing;
mod interlock;
mod probing;

use lift_common::config::LiftConfig;
use lift_control_unit::controller::AxisController;
use lift_control_unit::cycle::CycleRunner;
use lift_hal::{SimHandle, SimStepper, SimSwitches, SimulatedLift};

pub type SimRunner = CycleRunner<SimStepper, SimSwitches>;

/// Generous bound: a full homing from mid-travel takes about 10k cycles.
pub const MAX_CYCLES: u64 = 100_000;

// ── Minimal config TOML ─────────────────────────────────────────────

pub const LIFT_TOML: &str = r#"
[shared]
service_name = "lift-test"

[axis]
min_position = 0.0
max_position = 119.0

[simulation]
carriage_start = 40.0
probe_contact = 62.5
"#;

pub fn config() -> LiftConfig {
    LiftConfig::from_toml_str(LIFT_TOML).unwrap()
}

/// Controller + runner on a fresh simulated lift.
pub fn lift(config: &LiftConfig) -> (SimRunner, SimHandle) {
    let (stepper, switches, sim) = SimulatedLift::build(config);
    let controller = AxisController::new(&config.axis, stepper, switches).unwrap();
    (CycleRunner::new(controller, &config.cycle), sim)
}

/// Run homing until it leaves the active states.
pub fn home(runner: &mut SimRunner) -> u64 {
    runner.controller_mut().homing();
    runner
        .run_until(|c| !c.homing_state().is_active(), MAX_CYCLES)
        .unwrap()
}

/// Run probing until it leaves the active states.
pub fn probe(runner: &mut SimRunner) -> u64 {
    assert!(runner.controller_mut().probing().is_accepted());
    runner
        .run_until(|c| !c.probing_state().is_active(), MAX_CYCLES)
        .unwrap()
}

/// Run until the axis is in position or held by the interlock.
///
/// Always runs at least one cycle so a hold from before the call is
/// re-evaluated.
pub fn settle(runner: &mut SimRunner) -> u64 {
    runner.run_cycle();
    1 + runner
        .run_until(
            |c| c.in_position() || !c.last_permit().is_advance(),
            MAX_CYCLES,
        )
        .unwrap()
}

/// A lift that has been homed successfully.
pub fn homed_lift() -> (SimRunner, SimHandle) {
    let (mut runner, sim) = lift(&config());
    home(&mut runner);
    assert!(runner.controller().is_homed());
    (runner, sim)
}

//! Integration test: homing against the simulated minimum endstop.

use lift_common::axis::fault::FaultReason;
use lift_common::axis::state::{AxisState, HomingState};
use lift_control_unit::command::{CommandOutcome, DropReason};
use lift_control_unit::safety::{HoldReason, Permit};
use lift_hal::{SimInput, SwitchFault};

use super::{MAX_CYCLES, config, home, lift};

#[test]
fn homes_from_mid_travel() {
    let (mut runner, sim) = lift(&config());
    let cycles = home(&mut runner);
    let ctrl = runner.controller();

    assert_eq!(ctrl.homing_state(), HomingState::Finished);
    assert!(cycles > 1_000, "homing took only {cycles} cycles");
    // Reference lands exactly on the switching edge.
    assert_eq!(sim.carriage_steps(), 0);
    assert_eq!(ctrl.current_position_mm(), 0.0);
    assert_eq!(ctrl.target_position_mm(), 0.0);
    assert_eq!(ctrl.work_offset_mm(), 0.0);
    assert_eq!(ctrl.state(), AxisState::InPosition);
    assert!(ctrl.endstop_min());
}

#[test]
fn homes_when_starting_on_the_endstop() {
    let mut cfg = config();
    cfg.simulation.carriage_start = 0.0;
    let (mut runner, sim) = lift(&cfg);
    assert!(runner.controller().endstop_min());

    let mut visited = Vec::new();
    runner
        .run_until(
            |c| {
                if visited.last() != Some(&c.homing_state()) {
                    visited.push(c.homing_state());
                }
                !c.homing_state().is_active()
            },
            MAX_CYCLES,
        )
        .unwrap();

    assert!(!visited.contains(&HomingState::Error));
    assert!(!visited.contains(&HomingState::MoveFast));
    assert_eq!(
        visited,
        vec![
            HomingState::NotHomed,
            HomingState::BackoffPostContact,
            HomingState::MoveSlow,
            HomingState::Finished,
        ]
    );
    assert_eq!(runner.controller().current_position_mm(), 0.0);
    assert_eq!(sim.carriage_steps(), 0);
}

#[test]
fn stuck_open_endstop_faults_and_holds_motion() {
    let (mut runner, sim) = lift(&config());
    sim.inject(SimInput::EndstopMin, SwitchFault::StuckOpen);
    home(&mut runner);

    let ctrl = runner.controller();
    assert_eq!(ctrl.homing_state(), HomingState::Error);
    assert_eq!(ctrl.homing_fault(), Some(FaultReason::NoContact));
    assert!(ctrl.is_error());
    assert!(sim.at_hard_stop());
    assert!(ctrl.motion().lost_steps() > 0);

    // Nothing moves until homing is re-issued.
    let carriage = sim.carriage_steps();
    assert_eq!(
        runner.controller_mut().move_to_position(50.0),
        CommandOutcome::Dropped(DropReason::NotHomed)
    );
    runner.run_for(500).unwrap();
    assert_eq!(sim.carriage_steps(), carriage);
    assert_eq!(
        runner.controller().last_permit(),
        Permit::Hold(HoldReason::HomingFault)
    );

    sim.inject(SimInput::EndstopMin, SwitchFault::None);
    home(&mut runner);
    assert!(runner.controller().is_homed());
    assert_eq!(runner.controller().homing_fault(), None);
    assert_eq!(sim.carriage_steps(), 0);
}

#[test]
fn stuck_closed_endstop_fails_backoff() {
    let (mut runner, sim) = lift(&config());
    sim.inject(SimInput::EndstopMin, SwitchFault::StuckClosed);
    home(&mut runner);

    assert_eq!(runner.controller().homing_state(), HomingState::Error);
    assert_eq!(
        runner.controller().homing_fault(),
        Some(FaultReason::BackoffFailed)
    );
}

#[test]
fn rehoming_resets_work_offset() {
    let (mut runner, _sim) = lift(&config());
    home(&mut runner);
    super::probe(&mut runner);
    assert!(runner.controller().work_offset_mm() > 0.0);

    home(&mut runner);
    assert_eq!(runner.controller().work_offset_mm(), 0.0);
    assert_eq!(runner.controller().target_position_mm(), 0.0);
}

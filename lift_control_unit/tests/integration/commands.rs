//! Integration test: command surface and queries on a homed lift.

use lift_common::axis::state::AxisState;
use lift_control_unit::command::{AxisCommand, CommandOutcome, DropReason};

use super::{config, homed_lift, lift, probe, settle};

#[test]
fn commands_dropped_before_homing_leave_motion_alone() {
    let (mut runner, sim) = lift(&config());
    let start = sim.carriage_steps();

    for cmd in [
        AxisCommand::MoveToTarget,
        AxisCommand::MoveToPosition(20.0),
        AxisCommand::MoveToMax,
        AxisCommand::MoveToMin,
        AxisCommand::MoveToWorkpiece,
        AxisCommand::Jog(1.0),
        AxisCommand::Probe,
    ] {
        assert_eq!(
            runner.controller_mut().execute(cmd),
            CommandOutcome::Dropped(DropReason::NotHomed),
            "{cmd}"
        );
    }
    assert_eq!(runner.controller().motion().target(), 0);
    assert_eq!(sim.carriage_steps(), start);
}

#[test]
fn move_to_max_and_min() {
    let (mut runner, sim) = homed_lift();

    assert!(runner.controller_mut().move_to_max().is_accepted());
    assert_eq!(runner.controller().state(), AxisState::MoveToTarget);
    settle(&mut runner);
    assert_eq!(runner.controller().machine_position_mm(), 119.0);
    assert_eq!(sim.carriage_mm(), 119.0);
    assert!(!runner.controller().endstop_max());

    assert!(runner.controller_mut().move_to_min().is_accepted());
    settle(&mut runner);
    assert_eq!(runner.controller().machine_position_mm(), 0.0);
    assert!(runner.controller().endstop_min());
    assert_eq!(runner.controller().state(), AxisState::InPosition);
}

#[test]
fn relative_and_absolute_targets_after_probing() {
    let (mut runner, _sim) = homed_lift();
    probe(&mut runner);

    runner
        .controller_mut()
        .execute(AxisCommand::MoveToPosition(10.0));
    settle(&mut runner);
    assert_eq!(runner.controller().current_position_mm(), 10.0);
    assert_eq!(runner.controller().machine_position_mm(), 72.5);

    runner
        .controller_mut()
        .execute(AxisCommand::SetAbsoluteTarget(20.0));
    assert_eq!(runner.controller().target_position_mm(), -42.5);
    runner.controller_mut().execute(AxisCommand::MoveToTarget);
    settle(&mut runner);
    assert_eq!(runner.controller().machine_position_mm(), 20.0);

    runner.controller_mut().execute(AxisCommand::MoveToWorkpiece);
    settle(&mut runner);
    assert_eq!(runner.controller().current_position_mm(), 0.0);
}

#[test]
fn out_of_range_targets_clamp() {
    let (mut runner, _sim) = homed_lift();
    probe(&mut runner);

    runner.controller_mut().set_relative_target(500.0);
    assert_eq!(runner.controller().target_position_mm(), 119.0 - 62.5);
    runner.controller_mut().set_relative_target(-500.0);
    assert_eq!(runner.controller().target_position_mm(), -62.5);
    runner.controller_mut().set_absolute_target(-1.0);
    assert_eq!(runner.controller().target_position_steps(), 0);

    // Saturates towards the upper bound with a work offset applied.
    let (_, max) = runner.controller().travel_bounds_steps();
    runner.controller_mut().set_relative_target(1.0e300);
    assert_eq!(runner.controller().target_position_steps(), max);
    assert!(runner.controller_mut().execute(AxisCommand::MoveToPosition(1.0e30)).is_accepted());
    assert_eq!(runner.controller().motion().target(), max);
}

#[test]
fn jog_then_commit() {
    let (mut runner, _sim) = homed_lift();
    let ctrl = runner.controller_mut();
    ctrl.set_relative_target(5.0);
    for _ in 0..10 {
        ctrl.execute(AxisCommand::Jog(0.01));
    }
    assert!((ctrl.target_position_mm() - 5.1).abs() < 1e-9);
    assert_eq!(ctrl.motion().target(), 0);

    ctrl.move_to_target();
    settle(&mut runner);
    assert!((runner.controller().current_position_mm() - 5.1).abs() < 1e-9);
}

#[test]
fn snapshot_reports_everything() {
    let (mut runner, _sim) = homed_lift();
    probe(&mut runner);
    let snap = runner.controller().snapshot();

    assert!(snap.homed);
    assert!(snap.in_position);
    assert_eq!(snap.work_offset_mm, 62.5);
    assert_eq!(snap.position_mm, 0.0);
    assert!(snap.switches.probe);
    assert!(!snap.error);

    let json = serde_json::to_value(snap).unwrap();
    assert_eq!(json["state"], "InPosition");
    assert_eq!(json["probing"], "Finished");
    assert_eq!(json["work_offset_mm"], 62.5);
}

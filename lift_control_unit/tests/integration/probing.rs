//! Integration test: probing the workpiece surface.

use lift_common::axis::fault::FaultReason;
use lift_common::axis::state::{AxisState, ProbingState};
use lift_control_unit::command::{CommandOutcome, DropReason};
use lift_control_unit::safety::{HoldReason, Permit};
use lift_hal::{SimInput, SwitchFault};

use super::{MAX_CYCLES, config, home, homed_lift, lift, probe};

#[test]
fn probe_records_surface_as_work_origin() {
    let (mut runner, sim) = homed_lift();
    probe(&mut runner);
    let ctrl = runner.controller();

    assert_eq!(ctrl.probing_state(), ProbingState::Finished);
    assert_eq!(ctrl.probing_fault(), None);
    // The plate closes at 62.5 mm = 12 500 steps.
    assert_eq!(ctrl.work_offset_steps(), 12_500);
    assert_eq!(ctrl.work_offset_mm(), 62.5);
    assert_eq!(sim.carriage_steps(), 12_500);
    assert_eq!(ctrl.target_position_mm(), 0.0);
    assert_eq!(ctrl.current_position_mm(), 0.0);
    assert_eq!(ctrl.machine_position_mm(), 62.5);
    assert_eq!(ctrl.state(), AxisState::InPosition);
}

#[test]
fn probe_reports_probing_state_while_running() {
    let (mut runner, _sim) = homed_lift();
    runner.controller_mut().probing();
    runner.run_for(10).unwrap();
    assert_eq!(runner.controller().probing_state(), ProbingState::MoveFast);
    assert_eq!(runner.controller().state(), AxisState::Probing);
    assert_eq!(
        runner.controller_mut().move_to_max(),
        CommandOutcome::Dropped(DropReason::ProbingActive)
    );
}

#[test]
fn probe_starting_in_contact_backs_off_first() {
    let (mut runner, sim) = homed_lift();
    // Inside the backoff distance of the plate.
    runner.controller_mut().move_to_position(64.0);
    super::settle(&mut runner);
    assert!(runner.controller().probe());

    runner.controller_mut().probing();
    runner.run_for(1).unwrap();
    assert_eq!(
        runner.controller().probing_state(),
        ProbingState::BackoffPostContact
    );
    runner
        .run_until(|c| !c.probing_state().is_active(), MAX_CYCLES)
        .unwrap();
    assert_eq!(runner.controller().work_offset_steps(), 12_500);
    assert_eq!(sim.carriage_steps(), 12_500);
}

#[test]
fn probe_without_contact_faults_and_holds() {
    let mut cfg = config();
    cfg.simulation.probe_fitted = false;
    cfg.axis.travel.max_probe_distance = 60.0;
    let (mut runner, sim) = lift(&cfg);
    home(&mut runner);
    probe(&mut runner);

    let ctrl = runner.controller();
    assert_eq!(ctrl.probing_state(), ProbingState::Error);
    assert_eq!(ctrl.probing_fault(), Some(FaultReason::NoContact));
    assert!(ctrl.is_error());
    assert_eq!(ctrl.last_permit(), Permit::Hold(HoldReason::ProbingFault));
    assert_eq!(sim.carriage_mm(), 60.0);
}

#[test]
fn probe_run_stalls_on_max_endstop() {
    let mut cfg = config();
    cfg.simulation.probe_fitted = false;
    let (mut runner, sim) = lift(&cfg);
    home(&mut runner);
    runner.controller_mut().probing();
    runner
        .run_until(|c| !c.last_permit().is_advance(), MAX_CYCLES)
        .unwrap();

    let ctrl = runner.controller();
    assert_eq!(ctrl.last_permit(), Permit::Hold(HoldReason::EndstopMax));
    assert_eq!(ctrl.probing_state(), ProbingState::MoveFast);
    assert!(ctrl.endstop_max());
    assert!(!sim.at_hard_stop());

    // Re-homing is the way out.
    home(&mut runner);
    assert!(runner.controller().is_homed());
    assert_eq!(runner.controller().probing_state(), ProbingState::Finished);
}

#[test]
fn stuck_closed_probe_fails_backoff() {
    let (mut runner, sim) = homed_lift();
    runner.controller_mut().move_to_position(20.0);
    super::settle(&mut runner);
    sim.inject(SimInput::Probe, SwitchFault::StuckClosed);
    probe(&mut runner);
    assert_eq!(
        runner.controller().probing_fault(),
        Some(FaultReason::BackoffFailed)
    );
}

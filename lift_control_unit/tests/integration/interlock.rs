//! Integration test: endstop interlock during target moves.

use lift_common::axis::fault::AxisFault;
use lift_control_unit::safety::{HoldReason, Permit};
use lift_common::hal::MotionPrimitive;
use lift_hal::{SimInput, SwitchFault};

use super::{homed_lift, settle};

#[test]
fn min_endstop_stops_downward_move_on_the_same_tick() {
    let (mut runner, sim) = homed_lift();
    runner.controller_mut().move_to_position(50.0);
    settle(&mut runner);

    runner.controller_mut().move_to_position(10.0);
    runner.run_for(200).unwrap();
    assert!(runner.controller().motion().distance_remaining() < 0);

    sim.inject(SimInput::EndstopMin, SwitchFault::StuckClosed);
    let logical = runner.controller().motion().current_position();
    let carriage = sim.carriage_steps();
    runner.run_cycle();

    assert_eq!(runner.controller().motion().current_position(), logical);
    assert_eq!(sim.carriage_steps(), carriage);
    assert_eq!(
        runner.controller().last_permit(),
        Permit::Hold(HoldReason::EndstopMin)
    );
    assert!(runner.controller().faults().contains(AxisFault::ENDSTOP_MIN));
    assert!(runner.controller().is_error());

    // Held for as long as the switch reads closed.
    runner.run_for(100).unwrap();
    assert_eq!(sim.carriage_steps(), carriage);

    sim.inject(SimInput::EndstopMin, SwitchFault::None);
    settle(&mut runner);
    assert_eq!(runner.controller().current_position_mm(), 10.0);
    assert!(!runner.controller().is_error());
}

#[test]
fn closed_min_endstop_allows_moving_away() {
    let (mut runner, sim) = homed_lift();
    assert!(runner.controller().endstop_min());
    runner.controller_mut().move_to_position(5.0);
    settle(&mut runner);
    assert_eq!(runner.controller().last_permit(), Permit::Advance);
    assert_eq!(sim.carriage_mm(), 5.0);
}

#[test]
fn max_endstop_stops_upward_move() {
    let (mut runner, sim) = homed_lift();
    runner.controller_mut().move_to_max();
    runner.run_for(300).unwrap();
    sim.inject(SimInput::EndstopMax, SwitchFault::StuckClosed);
    settle(&mut runner);

    assert_eq!(
        runner.controller().last_permit(),
        Permit::Hold(HoldReason::EndstopMax)
    );
    assert!(runner.controller().endstop_max());
    let held_at = sim.carriage_steps();
    runner.run_for(50).unwrap();
    assert_eq!(sim.carriage_steps(), held_at);

    // Reversing is permitted.
    runner.controller_mut().move_to_min();
    settle(&mut runner);
    assert_eq!(runner.controller().last_permit(), Permit::Advance);
    assert_eq!(sim.carriage_steps(), 0);
}

#[test]
fn motion_flag_follows_the_axis() {
    let (mut runner, _sim) = homed_lift();
    let flag = runner.controller().motion_flag();
    runner.run_cycle();
    assert!(!flag.is_running());

    runner.controller_mut().move_to_position(3.0);
    runner.run_cycle();
    assert!(flag.is_running());
    settle(&mut runner);
    runner.run_cycle();
    assert!(!flag.is_running());
}

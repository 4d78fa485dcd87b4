//! Simulation driver module.
//!
//! Models a lift carriage on a lead screw: a step generator that moves the
//! carriage, two endstops and a probe plate whose state follows from the
//! carriage position, and mechanical hard stops the carriage cannot pass.

mod carriage;
mod io;
mod stepper;

pub use carriage::Carriage;
pub use io::{FaultInjector, SimInput, SimSwitches, SwitchFault};
pub use stepper::SimStepper;

use lift_common::axis::units::StepConversion;
use lift_common::config::LiftConfig;
use std::time::Duration;

/// Test and operator access to a running simulation.
#[derive(Debug, Clone)]
pub struct SimHandle {
    carriage: Carriage,
    faults: FaultInjector,
    units: StepConversion,
}

impl SimHandle {
    /// Physical carriage position [steps, frame coordinates].
    pub fn carriage_steps(&self) -> i64 {
        self.carriage.position()
    }

    /// Physical carriage position [mm, frame coordinates].
    pub fn carriage_mm(&self) -> f64 {
        self.units.steps_to_mm(self.carriage.position())
    }

    /// Whether the carriage is pressed against a mechanical stop.
    pub fn at_hard_stop(&self) -> bool {
        self.carriage.at_hard_stop()
    }

    /// Force an input into a failure mode (or clear it with `SwitchFault::None`).
    pub fn inject(&self, input: SimInput, fault: SwitchFault) {
        self.faults.set(input, fault);
    }

    /// Shared fault injector.
    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }
}

/// Factory for a complete simulated lift.
pub struct SimulatedLift;

impl SimulatedLift {
    /// Build the stepper, the switches and a handle that all share one carriage.
    pub fn build(config: &LiftConfig) -> (SimStepper, SimSwitches, SimHandle) {
        let units = config.axis.units();
        let sim = &config.simulation;
        let carriage = Carriage::new(
            units.mm_to_steps(sim.carriage_start),
            units.mm_to_steps(sim.hard_stop_min),
            units.mm_to_steps(sim.hard_stop_max),
        );
        let faults = FaultInjector::new();
        let cycle = Duration::from_micros(config.cycle.cycle_time_us as u64);

        let stepper = SimStepper::new(carriage.clone(), cycle);
        let switches = SimSwitches::new(
            carriage.clone(),
            config.axis.pins,
            units.mm_to_steps(sim.endstop_min),
            units.mm_to_steps(sim.endstop_max),
            sim.probe_fitted.then(|| units.mm_to_steps(sim.probe_contact)),
            faults.clone(),
        );
        let handle = SimHandle {
            carriage,
            faults,
            units,
        };
        (stepper, switches, handle)
    }
}

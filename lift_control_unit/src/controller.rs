//! Axis controller: position/offset model, sequences, interlock and the
//! command/query surface.
//!
//! ## Coordinates
//!
//! All positions are held in steps. *Machine* coordinates have 0 at the
//! minimum endstop edge found by homing. *Work* coordinates subtract the
//! work offset recorded by probing. Millimetres only appear at the
//! command/query boundary.
//!
//! ## Tick
//!
//! 1. Sample endstops and probe.
//! 2. Run the homing sequence if not finished, else the probing sequence if
//!    not finished.
//! 3. Evaluate the interlock; advance the motion primitive if permitted.
//! 4. Publish the running flag.

use lift_common::axis::config::AxisConfig;
use lift_common::axis::fault::{AxisFault, FaultReason};
use lift_common::axis::state::{AxisState, HomingState, ProbingState};
use lift_common::axis::units::StepConversion;
use lift_common::config::ConfigError;
use lift_common::hal::{DigitalInputs, MotionPrimitive};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::command::{AxisCommand, CommandOutcome, DropReason};
use crate::safety::{self, InterlockInput, Permit};
use crate::shared::{MotionFlag, MotionFlagReader};
use crate::state::{SequenceOutcome, SequenceProfile, SwitchSample, homing, probing};

// ─── Snapshot ───────────────────────────────────────────────────────

/// Every query of the controller in one serialisable value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisSnapshot {
    pub state: AxisState,
    pub homing: HomingState,
    pub probing: ProbingState,
    pub homing_fault: Option<FaultReason>,
    pub probing_fault: Option<FaultReason>,
    pub faults: AxisFault,
    /// Current position [mm, work coordinates].
    pub position_mm: f64,
    /// Current position [mm, machine coordinates].
    pub machine_position_mm: f64,
    /// Pending target [mm, work coordinates].
    pub target_mm: f64,
    /// Work origin [mm, machine coordinates].
    pub work_offset_mm: f64,
    pub in_position: bool,
    pub homed: bool,
    pub error: bool,
    pub switches: SwitchSample,
    /// Interlock decision of the most recent tick.
    pub permit: Permit,
}

// ─── Controller ─────────────────────────────────────────────────────

/// Single-axis router lift controller.
///
/// Owns the motion primitive and the input reader; is the only caller of
/// their mutating operations. Not re-entrant: `tick()` and the commands
/// must be dispatched from one context.
#[derive(Debug)]
pub struct AxisController<M, I> {
    motion: M,
    inputs: I,
    config: AxisConfig,
    units: StepConversion,
    homing_profile: SequenceProfile,
    probing_profile: SequenceProfile,
    /// Standard move speed [steps/s].
    travel_speed: f64,
    min_position_steps: i64,
    max_position_steps: i64,
    work_offset_steps: i64,
    target_position_steps: i64,
    homing_state: HomingState,
    probing_state: ProbingState,
    homing_fault: Option<FaultReason>,
    probing_fault: Option<FaultReason>,
    last_sample: SwitchSample,
    last_permit: Permit,
    running: MotionFlag,
}

impl<M: MotionPrimitive, I: DigitalInputs> AxisController<M, I> {
    /// Create a controller for a validated axis configuration.
    ///
    /// Programs the start-up speed limit and acceleration, declares the
    /// current position as step 0 and arms homing.
    pub fn new(config: &AxisConfig, mut motion: M, inputs: I) -> Result<Self, ConfigError> {
        config.validate()?;
        let units = config.units();
        let min_position_steps = units.mm_to_steps(config.min_position);
        let max_position_steps = units.mm_to_steps(config.max_position);

        motion.set_speed_limit(config.speeds.initial_speed_limit);
        motion.set_acceleration(units.rate_to_steps(config.speeds.acceleration));
        motion.set_current_position(0);
        motion.move_to(0);

        debug!(
            "Axis controller created: {:.1} steps/mm, travel [{min_position_steps}, {max_position_steps}] steps",
            units.steps_per_mm()
        );

        Ok(Self {
            motion,
            inputs,
            config: *config,
            units,
            homing_profile: SequenceProfile::homing(config),
            probing_profile: SequenceProfile::probing(config),
            travel_speed: units.rate_to_steps(config.speeds.travel),
            min_position_steps,
            max_position_steps,
            work_offset_steps: 0,
            target_position_steps: 0i64.clamp(min_position_steps, max_position_steps),
            homing_state: HomingState::NotHomed,
            probing_state: ProbingState::Finished,
            homing_fault: None,
            probing_fault: None,
            last_sample: SwitchSample::default(),
            last_permit: Permit::Advance,
            running: MotionFlag::new(),
        })
    }

    // ─── Tick ───────────────────────────────────────────────────────

    /// One control increment. Never blocks.
    pub fn tick(&mut self) -> Permit {
        let sample = self.sample();
        self.last_sample = sample;

        if !self.homing_state.is_finished() {
            self.run_homing(sample.endstop_min);
        } else if !self.probing_state.is_finished() {
            self.run_probing(sample.probe);
        }

        let permit = safety::evaluate(&InterlockInput {
            homed: self.homing_state.is_finished(),
            faults: self.fault_word(&sample),
            distance_remaining: self.motion.distance_remaining(),
        });
        if permit.is_advance() {
            self.motion.advance();
        } else if permit != self.last_permit {
            debug!("Motion held: {permit:?}");
        }
        self.last_permit = permit;
        self.running.publish(self.motion.is_moving());
        permit
    }

    fn run_homing(&mut self, contact: bool) {
        let prev = self.homing_state;
        let t = homing::step(prev, contact, &mut self.motion, &self.homing_profile);
        if t.next != prev {
            debug!("Homing: {prev} -> {}", t.next);
        }
        self.homing_state = t.next;
        match t.outcome {
            Some(SequenceOutcome::Completed) => {
                self.probing_state = ProbingState::Finished;
                self.work_offset_steps = 0;
                self.target_position_steps = self.clamp(0);
                info!("Homing finished, reference established");
            }
            Some(SequenceOutcome::Faulted(reason)) => {
                self.homing_fault = Some(reason);
                warn!("Homing fault in {prev}: {reason}");
            }
            None => {}
        }
    }

    fn run_probing(&mut self, contact: bool) {
        let prev = self.probing_state;
        let t = probing::step(prev, contact, &mut self.motion, &self.probing_profile);
        if t.next != prev {
            debug!("Probing: {prev} -> {}", t.next);
        }
        self.probing_state = t.next;
        match t.outcome {
            Some(SequenceOutcome::Completed) => {
                self.work_offset_steps = self.motion.current_position();
                self.target_position_steps = self.clamp(self.work_offset_steps);
                info!(
                    "Probing finished, work offset {:.3} mm",
                    self.units.steps_to_mm(self.work_offset_steps)
                );
            }
            Some(SequenceOutcome::Faulted(reason)) => {
                self.probing_fault = Some(reason);
                warn!("Probing fault in {prev}: {reason}");
            }
            None => {}
        }
    }

    // ─── Commands ───────────────────────────────────────────────────

    /// Dispatch a command value.
    pub fn execute(&mut self, command: AxisCommand) -> CommandOutcome {
        info!("Command: {command}");
        let outcome = match command {
            AxisCommand::Home => {
                self.homing();
                CommandOutcome::Accepted
            }
            AxisCommand::Probe => self.probing(),
            AxisCommand::SetTarget(mm) => {
                self.set_relative_target(mm);
                CommandOutcome::Accepted
            }
            AxisCommand::SetAbsoluteTarget(mm) => {
                self.set_absolute_target(mm);
                CommandOutcome::Accepted
            }
            AxisCommand::MoveToTarget => self.move_to_target(),
            AxisCommand::MoveToPosition(mm) => self.move_to_position(mm),
            AxisCommand::Jog(mm) => self.jog(mm),
            AxisCommand::MoveToMax => self.move_to_max(),
            AxisCommand::MoveToMin => self.move_to_min(),
            AxisCommand::MoveToWorkpiece => self.move_to_workpiece(),
        };
        if let CommandOutcome::Dropped(reason) = outcome {
            info!("Command dropped ({command}): {reason}");
        }
        outcome
    }

    /// Re-arm homing. Cancels any probing cycle in progress.
    pub fn homing(&mut self) {
        self.homing_state = HomingState::NotHomed;
        self.probing_state = ProbingState::Finished;
        self.homing_fault = None;
        self.probing_fault = None;
    }

    /// Clear the work offset and arm probing. Requires a finished homing.
    pub fn probing(&mut self) -> CommandOutcome {
        if !self.homing_state.is_finished() {
            return CommandOutcome::Dropped(DropReason::NotHomed);
        }
        self.work_offset_steps = 0;
        self.probing_state = ProbingState::NotProbed;
        self.probing_fault = None;
        CommandOutcome::Accepted
    }

    /// Pending target in work coordinates, clamped to the travel bounds.
    pub fn set_relative_target(&mut self, mm: f64) {
        let steps = self.units.mm_to_steps(mm).saturating_add(self.work_offset_steps);
        self.target_position_steps = self.clamp(steps);
    }

    /// Pending target in machine coordinates, clamped to the travel bounds.
    pub fn set_absolute_target(&mut self, mm: f64) {
        self.set_absolute_target_steps(self.units.mm_to_steps(mm));
    }

    pub fn set_absolute_target_steps(&mut self, steps: i64) {
        self.target_position_steps = self.clamp(steps);
    }

    /// Commit the pending target at the standard move speed.
    ///
    /// Dropped unless both sequences are finished.
    pub fn move_to_target(&mut self) -> CommandOutcome {
        if !self.homing_state.is_finished() {
            return CommandOutcome::Dropped(DropReason::NotHomed);
        }
        if !self.probing_state.is_finished() {
            return CommandOutcome::Dropped(DropReason::ProbingActive);
        }
        self.motion.set_speed_limit(self.travel_speed);
        self.motion.move_to(self.target_position_steps);
        CommandOutcome::Accepted
    }

    /// `set_relative_target` followed by `move_to_target`.
    pub fn move_to_position(&mut self, mm: f64) -> CommandOutcome {
        self.set_relative_target(mm);
        self.move_to_target()
    }

    /// Shift the pending target by `mm` without committing it.
    pub fn jog(&mut self, mm: f64) -> CommandOutcome {
        if !self.homing_state.is_finished() {
            return CommandOutcome::Dropped(DropReason::NotHomed);
        }
        self.target_position_steps =
            self.clamp(self.target_position_steps.saturating_add(self.units.mm_to_steps(mm)));
        CommandOutcome::Accepted
    }

    pub fn move_to_max(&mut self) -> CommandOutcome {
        self.set_absolute_target_steps(self.max_position_steps);
        self.move_to_target()
    }

    pub fn move_to_min(&mut self) -> CommandOutcome {
        self.set_absolute_target_steps(self.min_position_steps);
        self.move_to_target()
    }

    pub fn move_to_workpiece(&mut self) -> CommandOutcome {
        self.set_absolute_target_steps(self.work_offset_steps);
        self.move_to_target()
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// Current position [mm, work coordinates].
    pub fn current_position_mm(&self) -> f64 {
        self.units
            .steps_to_mm(self.motion.current_position() - self.work_offset_steps)
    }

    /// Current position [mm, machine coordinates].
    pub fn machine_position_mm(&self) -> f64 {
        self.units.steps_to_mm(self.motion.current_position())
    }

    /// Pending target [mm, work coordinates].
    pub fn target_position_mm(&self) -> f64 {
        self.units
            .steps_to_mm(self.target_position_steps - self.work_offset_steps)
    }

    /// Work origin [mm, machine coordinates].
    pub fn work_offset_mm(&self) -> f64 {
        self.units.steps_to_mm(self.work_offset_steps)
    }

    #[inline]
    pub fn target_position_steps(&self) -> i64 {
        self.target_position_steps
    }

    #[inline]
    pub fn work_offset_steps(&self) -> i64 {
        self.work_offset_steps
    }

    /// Travel bounds [steps, machine coordinates].
    #[inline]
    pub fn travel_bounds_steps(&self) -> (i64, i64) {
        (self.min_position_steps, self.max_position_steps)
    }

    /// Not moving and nothing left to travel.
    pub fn in_position(&self) -> bool {
        !self.motion.is_moving() && self.motion.distance_remaining() == 0
    }

    #[inline]
    pub fn is_homed(&self) -> bool {
        self.homing_state.is_finished()
    }

    /// A sequence faulted or an endstop is closed right now.
    pub fn is_error(&self) -> bool {
        !self.faults().is_empty()
    }

    /// Fault flags from the sequence states and a fresh endstop read.
    pub fn faults(&self) -> AxisFault {
        self.fault_word(&self.sample())
    }

    /// Dominant activity: homing, probing, moving, in position, at max,
    /// at min, idle, in that priority.
    pub fn state(&self) -> AxisState {
        if !self.homing_state.is_finished() {
            AxisState::Homing
        } else if !self.probing_state.is_finished() {
            AxisState::Probing
        } else if self.motion.distance_remaining() != 0 {
            AxisState::MoveToTarget
        } else if self.in_position() {
            AxisState::InPosition
        } else if self.endstop_max() {
            AxisState::MaxReached
        } else if self.endstop_min() {
            AxisState::MinReached
        } else {
            AxisState::Idle
        }
    }

    #[inline]
    pub fn homing_state(&self) -> HomingState {
        self.homing_state
    }

    #[inline]
    pub fn probing_state(&self) -> ProbingState {
        self.probing_state
    }

    /// Why homing last entered `Error`, until re-armed.
    #[inline]
    pub fn homing_fault(&self) -> Option<FaultReason> {
        self.homing_fault
    }

    /// Why probing last entered `Error`, until re-armed.
    #[inline]
    pub fn probing_fault(&self) -> Option<FaultReason> {
        self.probing_fault
    }

    pub fn endstop_min(&self) -> bool {
        let pins = &self.config.pins;
        pins.endstop_level.is_active(self.inputs.is_high(pins.endstop_min))
    }

    pub fn endstop_max(&self) -> bool {
        let pins = &self.config.pins;
        pins.endstop_level.is_active(self.inputs.is_high(pins.endstop_max))
    }

    pub fn probe(&self) -> bool {
        let pins = &self.config.pins;
        pins.probe_level.is_active(self.inputs.is_high(pins.probe))
    }

    /// Interlock decision of the most recent tick.
    #[inline]
    pub fn last_permit(&self) -> Permit {
        self.last_permit
    }

    /// Read-only "is running" handle for other contexts.
    pub fn motion_flag(&self) -> MotionFlagReader {
        self.running.reader()
    }

    pub fn snapshot(&self) -> AxisSnapshot {
        AxisSnapshot {
            state: self.state(),
            homing: self.homing_state,
            probing: self.probing_state,
            homing_fault: self.homing_fault,
            probing_fault: self.probing_fault,
            faults: self.faults(),
            position_mm: self.current_position_mm(),
            machine_position_mm: self.machine_position_mm(),
            target_mm: self.target_position_mm(),
            work_offset_mm: self.work_offset_mm(),
            in_position: self.in_position(),
            homed: self.is_homed(),
            error: self.is_error(),
            switches: self.sample(),
            permit: self.last_permit,
        }
    }

    #[inline]
    pub fn units(&self) -> StepConversion {
        self.units
    }

    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// Shared view of the motion primitive.
    pub fn motion(&self) -> &M {
        &self.motion
    }

    pub fn inputs(&self) -> &I {
        &self.inputs
    }

    // ─── Helpers ────────────────────────────────────────────────────

    fn sample(&self) -> SwitchSample {
        SwitchSample {
            endstop_min: self.endstop_min(),
            endstop_max: self.endstop_max(),
            probe: self.probe(),
        }
    }

    fn fault_word(&self, sample: &SwitchSample) -> AxisFault {
        let mut faults = AxisFault::empty();
        faults.set(AxisFault::HOMING_FAULT, self.homing_state.is_error());
        faults.set(AxisFault::PROBING_FAULT, self.probing_state.is_error());
        faults.set(AxisFault::ENDSTOP_MIN, sample.endstop_min);
        faults.set(AxisFault::ENDSTOP_MAX, sample.endstop_max);
        faults
    }

    #[inline]
    fn clamp(&self, steps: i64) -> i64 {
        steps.clamp(self.min_position_steps, self.max_position_steps)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

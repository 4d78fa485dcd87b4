//! Caller-facing command set.
//!
//! Every operation of the controller's command surface as a value, so the
//! caller (CLI, UI loop, tests) can queue and dispatch them uniformly via
//! [`AxisController::execute`](crate::controller::AxisController::execute).

use serde::Serialize;
use std::fmt;

/// A command to the axis controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisCommand {
    /// Re-arm and run the homing sequence.
    Home,
    /// Clear the work offset and run the probing sequence.
    Probe,
    /// Set the pending target [mm, work coordinates]. No motion.
    SetTarget(f64),
    /// Set the pending target [mm, machine coordinates]. No motion.
    SetAbsoluteTarget(f64),
    /// Commit the pending target to the motion primitive.
    MoveToTarget,
    /// Set a work-coordinate target and commit it.
    MoveToPosition(f64),
    /// Nudge the pending target by a signed distance [mm]. No motion.
    Jog(f64),
    MoveToMax,
    MoveToMin,
    /// Move to the recorded work origin.
    MoveToWorkpiece,
}

impl fmt::Display for AxisCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("home"),
            Self::Probe => f.write_str("probe"),
            Self::SetTarget(mm) => write!(f, "set target {mm:.3} mm"),
            Self::SetAbsoluteTarget(mm) => write!(f, "set absolute target {mm:.3} mm"),
            Self::MoveToTarget => f.write_str("move to target"),
            Self::MoveToPosition(mm) => write!(f, "move to {mm:.3} mm"),
            Self::Jog(mm) => write!(f, "jog {mm:+.3} mm"),
            Self::MoveToMax => f.write_str("move to max"),
            Self::MoveToMin => f.write_str("move to min"),
            Self::MoveToWorkpiece => f.write_str("move to workpiece"),
        }
    }
}

/// Why a command had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DropReason {
    /// Homing has not finished (never run, running, or faulted).
    NotHomed,
    /// A probing cycle is running or faulted.
    ProbingActive,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotHomed => f.write_str("axis not homed"),
            Self::ProbingActive => f.write_str("probing not finished"),
        }
    }
}

/// Result of issuing a command.
///
/// A dropped command leaves the motion primitive untouched; the pending
/// target may still have been updated for compound commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CommandOutcome {
    Accepted,
    Dropped(DropReason),
}

impl CommandOutcome {
    #[inline]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_display() {
        assert_eq!(AxisCommand::Home.to_string(), "home");
        assert_eq!(AxisCommand::Jog(-0.5).to_string(), "jog -0.500 mm");
        assert_eq!(AxisCommand::MoveToPosition(12.0).to_string(), "move to 12.000 mm");
    }

    #[test]
    fn outcome_helpers() {
        assert!(CommandOutcome::Accepted.is_accepted());
        assert!(!CommandOutcome::Dropped(DropReason::NotHomed).is_accepted());
        assert_eq!(DropReason::ProbingActive.to_string(), "probing not finished");
    }
}

//! State tags for the axis sequences and the coarse axis summary.
//!
//! The tags are plain data; the transition functions live in the control
//! unit. Labels match the texts shown on the lift's status display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Homing sequence state.
///
/// `NotHomed → BackoffPreCheck → MoveFast → BackoffPostContact → MoveSlow → Finished`,
/// with `Error` reachable from every intermediate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum HomingState {
    /// Sequence armed; no reference established.
    #[default]
    NotHomed = 0,
    /// Waiting for the axis to be idle with the endstop released.
    BackoffPreCheck = 1,
    /// Fast run towards the minimum endstop.
    MoveFast = 2,
    /// Retracting off the triggered endstop.
    BackoffPostContact = 3,
    /// Single-step creep back onto the endstop.
    MoveSlow = 4,
    /// Reference established at the minimum endstop.
    Finished = 5,
    /// Sequence aborted; motion inhibited until re-homed.
    Error = 6,
}

impl HomingState {
    #[inline]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    #[inline]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Sequence still has transitions to make.
    #[inline]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Finished | Self::Error)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotHomed => "None",
            Self::BackoffPreCheck => "Backoff 1",
            Self::MoveFast => "Move Fast",
            Self::BackoffPostContact => "Backoff 2",
            Self::MoveSlow => "Move slow",
            Self::Finished => "Homed",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for HomingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Probing sequence state.
///
/// `NotProbed → MoveFast → BackoffPostContact → MoveSlow → Finished`, with
/// `NotProbed` jumping straight to `BackoffPostContact` when the probe is
/// already closed, and `Error` reachable from every intermediate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ProbingState {
    /// Sequence armed.
    NotProbed = 0,
    /// Fast run towards the probe plate.
    MoveFast = 2,
    /// Retracting off the closed probe.
    BackoffPostContact = 3,
    /// Single-step creep back onto the probe.
    MoveSlow = 4,
    /// Work origin recorded (or no probe cycle requested).
    #[default]
    Finished = 5,
    /// Sequence aborted; motion inhibited until probed again.
    Error = 6,
}

impl ProbingState {
    #[inline]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    #[inline]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    #[inline]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Finished | Self::Error)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotProbed => "None",
            Self::MoveFast => "Move Fast",
            Self::BackoffPostContact => "Backoff 2",
            Self::MoveSlow => "Move slow",
            Self::Finished => "Probed",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for ProbingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse summary of what currently dominates the axis.
///
/// Evaluated in priority order: homing, probing, moving to target,
/// in position, at max, at min, idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum AxisState {
    #[default]
    Idle = 0,
    MoveToTarget = 1,
    Homing = 2,
    Probing = 3,
    InPosition = 4,
    MaxReached = 5,
    MinReached = 6,
}

impl AxisState {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "None",
            Self::MoveToTarget => "Go to Target",
            Self::Homing => "Go to Home",
            Self::Probing => "Go to Probe",
            Self::InPosition => "In Position",
            Self::MaxReached => "Max!",
            Self::MinReached => "Min!",
        }
    }
}

impl fmt::Display for AxisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

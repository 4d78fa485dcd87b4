//! Motion interlock.
//!
//! Evaluated every tick after the active sequence has run and before the
//! motion primitive is advanced. Once homed, a closed endstop blocks motion
//! towards it but not away from it; a sequence fault blocks everything.

use lift_common::axis::fault::AxisFault;
use serde::Serialize;

/// Why the interlock withheld the advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HoldReason {
    /// Minimum endstop closed with motion pending towards it.
    EndstopMin,
    /// Maximum endstop closed with motion pending towards it.
    EndstopMax,
    /// Homing sequence sits in `Error`.
    HomingFault,
    /// Probing sequence sits in `Error`.
    ProbingFault,
}

/// Interlock decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum Permit {
    /// Advance the motion primitive one increment.
    #[default]
    Advance,
    /// Leave the motion primitive untouched this tick.
    Hold(HoldReason),
}

impl Permit {
    #[inline]
    pub const fn is_advance(&self) -> bool {
        matches!(self, Self::Advance)
    }
}

/// Inputs to the interlock, all taken from the current tick.
#[derive(Debug, Clone, Copy)]
pub struct InterlockInput {
    /// Homing has reached `Finished`.
    pub homed: bool,
    /// Sequence faults plus the endstops as sampled this tick.
    pub faults: AxisFault,
    /// Target minus current position [steps].
    pub distance_remaining: i64,
}

/// Decide whether the motion primitive may advance.
///
/// Checks run in fixed order: endstop min, endstop max, homing fault,
/// probing fault. Endstops are ignored until homing is finished since the
/// homing sequence itself drives onto the minimum switch.
pub fn evaluate(input: &InterlockInput) -> Permit {
    let faults = input.faults;
    if input.homed && faults.contains(AxisFault::ENDSTOP_MIN) && input.distance_remaining < 0 {
        Permit::Hold(HoldReason::EndstopMin)
    } else if input.homed && faults.contains(AxisFault::ENDSTOP_MAX) && input.distance_remaining > 0
    {
        Permit::Hold(HoldReason::EndstopMax)
    } else if faults.inhibits_motion() {
        if faults.contains(AxisFault::HOMING_FAULT) {
            Permit::Hold(HoldReason::HomingFault)
        } else {
            Permit::Hold(HoldReason::ProbingFault)
        }
    } else {
        Permit::Advance
    }
}

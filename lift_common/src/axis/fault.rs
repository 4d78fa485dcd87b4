//! Axis fault flags.
//!
//! Sequence faults are terminal within their machine until the matching
//! start command is re-issued. Endstop flags mirror the live switch state.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Active fault conditions of one axis.
    ///
    /// MOTION_INHIBIT flags suppress every motion-primitive advance.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct AxisFault: u8 {
        /// Homing sequence ended in `Error`. **Inhibits motion**.
        const HOMING_FAULT  = 0x01;
        /// Probing sequence ended in `Error`. **Inhibits motion**.
        const PROBING_FAULT = 0x02;
        /// Minimum endstop currently closed.
        const ENDSTOP_MIN   = 0x04;
        /// Maximum endstop currently closed.
        const ENDSTOP_MAX   = 0x08;
    }
}

impl AxisFault {
    /// Flags that suppress motion.
    pub const MOTION_INHIBIT: Self =
        Self::from_bits_truncate(Self::HOMING_FAULT.bits() | Self::PROBING_FAULT.bits());

    #[inline]
    pub const fn inhibits_motion(&self) -> bool {
        self.intersects(Self::MOTION_INHIBIT)
    }
}

impl Default for AxisFault {
    fn default() -> Self {
        Self::empty()
    }
}

/// Why a sequence entered its `Error` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultReason {
    /// Switch stayed closed with the axis idle where it must have opened.
    ContactStuck,
    /// Full travel bound exhausted without the switch closing.
    NoContact,
    /// Retraction finished but the switch never released.
    BackoffFailed,
}

impl fmt::Display for FaultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ContactStuck => "switch stuck closed",
            Self::NoContact => "no contact within travel bound",
            Self::BackoffFailed => "switch did not release after backoff",
        };
        f.write_str(text)
    }
}

//! Prelude module for common re-exports.
//!
//! Consumers can do `use lift_common::prelude::*;` and get the most
//! important types without listing individual paths.

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LiftConfig, LogLevel, SharedConfig};

// ─── Axis ───────────────────────────────────────────────────────────
pub use crate::axis::config::{AxisConfig, PinConfig, SpeedConfig, TravelConfig};
pub use crate::axis::fault::{AxisFault, FaultReason};
pub use crate::axis::state::{AxisState, HomingState, ProbingState};
pub use crate::axis::units::StepConversion;

// ─── Hardware Contracts ─────────────────────────────────────────────
pub use crate::hal::{ActiveLevel, DigitalInputs, MotionPrimitive};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::DEFAULT_CYCLE_TIME_US;

//! Hardware contracts consumed by the axis controller.
//!
//! This module defines:
//! - `MotionPrimitive` trait - Step generator with a target/speed interface
//! - `DigitalInputs` trait - Raw pin level reads
//! - `ActiveLevel` enum - Pin polarity of a switch
//!
//! Both traits are implemented by `lift_hal` for simulation and by board
//! support code on real hardware. The controller is the only caller of the
//! mutating operations.

use serde::{Deserialize, Serialize};

/// Stepper motion profile generator.
///
/// Given a target step count and a speed limit, advances a virtual step
/// position over successive `advance()` calls. Acceleration and deceleration
/// timing are entirely the implementation's business.
///
/// # Contract
///
/// | Operation              | Effect                                                  |
/// |------------------------|---------------------------------------------------------|
/// | `move_to(abs)`         | New absolute target                                     |
/// | `move_by(delta)`       | New target relative to the current position             |
/// | `advance()`            | One non-blocking control increment                      |
/// | `set_current_position` | Re-zero the counter; target follows, speed drops to 0   |
/// | `stop()`               | Immediate halt at the current position                  |
pub trait MotionPrimitive {
    /// Maximum speed [steps/s].
    fn set_speed_limit(&mut self, steps_per_sec: f64);

    /// Acceleration and deceleration [steps/s²].
    fn set_acceleration(&mut self, steps_per_sec2: f64);

    fn move_by(&mut self, delta_steps: i64);

    fn move_to(&mut self, abs_steps: i64);

    /// Perform one control increment. Never blocks.
    fn advance(&mut self);

    fn is_moving(&self) -> bool;

    /// Target minus current position [steps]; negative means travel towards
    /// decreasing positions.
    fn distance_remaining(&self) -> i64;

    fn current_position(&self) -> i64;

    fn set_current_position(&mut self, steps: i64);

    fn stop(&mut self);
}

/// Raw digital input reads, sampled fresh on every call.
///
/// No debouncing is expected from the controller side.
pub trait DigitalInputs {
    /// Electrical level of `pin`.
    fn is_high(&self, pin: u8) -> bool;
}

/// Electrical level at which a switch counts as closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActiveLevel {
    /// Closed when the pin reads high.
    #[default]
    High,
    /// Closed when the pin reads low (pull-up wiring).
    Low,
}

impl ActiveLevel {
    /// Translate a raw pin level into "switch closed".
    #[inline]
    pub const fn is_active(&self, level_high: bool) -> bool {
        match self {
            Self::High => level_high,
            Self::Low => !level_high,
        }
    }

    /// Pin level a closed switch produces.
    #[inline]
    pub const fn level_when_active(&self) -> bool {
        matches!(self, Self::High)
    }
}

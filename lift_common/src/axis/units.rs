//! Step ↔ millimetre conversion.
//!
//! All positions are stored in whole steps; millimetres only appear at the
//! command/query boundary so rounding happens exactly once per conversion.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Machine constants that define the step/millimetre ratio of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepConversion {
    /// Full steps per motor revolution.
    pub steps_per_revolution: f64,
    /// Driver microstep setting.
    pub microsteps: f64,
    /// Spindle lead per revolution [mm].
    pub lead_per_revolution: f64,
}

impl StepConversion {
    pub const fn new(steps_per_revolution: f64, microsteps: f64, lead_per_revolution: f64) -> Self {
        Self {
            steps_per_revolution,
            microsteps,
            lead_per_revolution,
        }
    }

    /// Microsteps per millimetre of travel.
    #[inline]
    pub fn steps_per_mm(&self) -> f64 {
        self.steps_per_revolution * self.microsteps / self.lead_per_revolution
    }

    /// Millimetres → nearest whole step.
    #[inline]
    pub fn mm_to_steps(&self, mm: f64) -> i64 {
        (mm / self.lead_per_revolution * self.steps_per_revolution * self.microsteps).round() as i64
    }

    /// Steps → millimetres.
    #[inline]
    pub fn steps_to_mm(&self, steps: i64) -> f64 {
        steps as f64 * self.lead_per_revolution / (self.steps_per_revolution * self.microsteps)
    }

    /// Rate in mm/s (or mm/s²) → steps/s (or steps/s²), unrounded.
    #[inline]
    pub fn rate_to_steps(&self, mm_per_s: f64) -> f64 {
        mm_per_s * self.steps_per_mm()
    }

    /// Length of one step [mm].
    #[inline]
    pub fn resolution_mm(&self) -> f64 {
        self.steps_to_mm(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("steps_per_revolution", self.steps_per_revolution),
            ("microsteps", self.microsteps),
            ("lead_per_revolution", self.lead_per_revolution),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

//! Axis configuration: geometry, pins, speeds and travel bounds.
//!
//! Loaded from the `[axis]` table of `lift.toml`. Every field has a default
//! matching the stock router lift (200 steps/rev, 8 microsteps, 8 mm lead,
//! 0–119 mm travel).

use serde::{Deserialize, Serialize};

use crate::axis::units::StepConversion;
use crate::config::ConfigError;
use crate::consts::*;
use crate::hal::ActiveLevel;

/// Pin assignment and polarity of the axis I/O.
///
/// `step`, `dir` and `enable` belong to the motion primitive; the controller
/// itself only samples the three input pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinConfig {
    #[serde(default = "default_step_pin")]
    pub step: u8,
    #[serde(default = "default_dir_pin")]
    pub dir: u8,
    #[serde(default = "default_enable_pin")]
    pub enable: u8,
    #[serde(default = "default_endstop_min_pin")]
    pub endstop_min: u8,
    #[serde(default = "default_endstop_max_pin")]
    pub endstop_max: u8,
    #[serde(default = "default_probe_pin")]
    pub probe: u8,
    /// Level at which either endstop reads as triggered.
    #[serde(default = "default_endstop_level")]
    pub endstop_level: ActiveLevel,
    /// Level at which the probe reads as in contact.
    #[serde(default = "default_probe_level")]
    pub probe_level: ActiveLevel,
}

fn default_step_pin() -> u8 {
    12
}
fn default_dir_pin() -> u8 {
    11
}
fn default_enable_pin() -> u8 {
    10
}
fn default_endstop_min_pin() -> u8 {
    16
}
fn default_endstop_max_pin() -> u8 {
    17
}
fn default_probe_pin() -> u8 {
    18
}
fn default_endstop_level() -> ActiveLevel {
    ActiveLevel::High
}
fn default_probe_level() -> ActiveLevel {
    ActiveLevel::Low
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            step: default_step_pin(),
            dir: default_dir_pin(),
            enable: default_enable_pin(),
            endstop_min: default_endstop_min_pin(),
            endstop_max: default_endstop_max_pin(),
            probe: default_probe_pin(),
            endstop_level: default_endstop_level(),
            probe_level: default_probe_level(),
        }
    }
}

impl PinConfig {
    /// Input pins must be distinct from each other and from the outputs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pins = [
            ("step", self.step),
            ("dir", self.dir),
            ("enable", self.enable),
            ("endstop_min", self.endstop_min),
            ("endstop_max", self.endstop_max),
            ("probe", self.probe),
        ];
        for (i, (name_a, pin_a)) in pins.iter().enumerate() {
            for (name_b, pin_b) in &pins[i + 1..] {
                if pin_a == pin_b {
                    return Err(ConfigError::ValidationError(format!(
                        "pin {pin_a} assigned to both {name_a} and {name_b}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Speed profile [mm/s, mm/s²].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedConfig {
    /// Fast homing approach. Slow approaches run at half this.
    #[serde(default = "default_homing_speed")]
    pub homing: f64,
    /// Fast probing approach.
    #[serde(default = "default_probe_speed")]
    pub probe: f64,
    /// Target moves and backoff retractions.
    #[serde(default = "default_travel_speed")]
    pub travel: f64,
    #[serde(default = "default_acceleration")]
    pub acceleration: f64,
    /// Speed limit programmed at start-up [steps/s].
    #[serde(default = "default_initial_speed_limit")]
    pub initial_speed_limit: f64,
}

fn default_homing_speed() -> f64 {
    DEFAULT_HOMING_SPEED
}
fn default_probe_speed() -> f64 {
    DEFAULT_PROBE_SPEED
}
fn default_travel_speed() -> f64 {
    DEFAULT_TRAVEL_SPEED
}
fn default_acceleration() -> f64 {
    DEFAULT_ACCELERATION
}
fn default_initial_speed_limit() -> f64 {
    DEFAULT_INITIAL_SPEED_LIMIT
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            homing: DEFAULT_HOMING_SPEED,
            probe: DEFAULT_PROBE_SPEED,
            travel: DEFAULT_TRAVEL_SPEED,
            acceleration: DEFAULT_ACCELERATION,
            initial_speed_limit: DEFAULT_INITIAL_SPEED_LIMIT,
        }
    }
}

impl SpeedConfig {
    /// Slow-approach speed used by both sequences.
    #[inline]
    pub fn creep(&self) -> f64 {
        self.homing / SLOW_APPROACH_DIVISOR
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("speeds.homing", self.homing),
            ("speeds.probe", self.probe),
            ("speeds.travel", self.travel),
            ("speeds.acceleration", self.acceleration),
            ("speeds.initial_speed_limit", self.initial_speed_limit),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Bounded sequence distances [mm]. Exhausting a bound is a fault.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelConfig {
    #[serde(default = "default_max_home_distance")]
    pub max_home_distance: f64,
    #[serde(default = "default_max_probe_distance")]
    pub max_probe_distance: f64,
    #[serde(default = "default_backoff_distance")]
    pub backoff_distance: f64,
}

fn default_max_home_distance() -> f64 {
    DEFAULT_MAX_HOME_DISTANCE
}
fn default_max_probe_distance() -> f64 {
    DEFAULT_MAX_PROBE_DISTANCE
}
fn default_backoff_distance() -> f64 {
    DEFAULT_BACKOFF_DISTANCE
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            max_home_distance: DEFAULT_MAX_HOME_DISTANCE,
            max_probe_distance: DEFAULT_MAX_PROBE_DISTANCE,
            backoff_distance: DEFAULT_BACKOFF_DISTANCE,
        }
    }
}

impl TravelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("travel.max_home_distance", self.max_home_distance),
            ("travel.max_probe_distance", self.max_probe_distance),
            ("travel.backoff_distance", self.backoff_distance),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.backoff_distance >= self.max_home_distance
            || self.backoff_distance >= self.max_probe_distance
        {
            return Err(ConfigError::ValidationError(format!(
                "travel.backoff_distance ({}) must be shorter than both max distances",
                self.backoff_distance
            )));
        }
        Ok(())
    }
}

/// Complete configuration of the lift axis.
///
/// # TOML Example
///
/// ```toml
/// [axis]
/// steps_per_revolution = 200
/// microsteps = 8
/// lead_per_revolution = 8.0
/// min_position = 0.0
/// max_position = 119.0
///
/// [axis.speeds]
/// homing = 15.0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    #[serde(default = "default_steps_per_revolution")]
    pub steps_per_revolution: f64,
    #[serde(default = "default_microsteps")]
    pub microsteps: f64,
    /// Spindle lead per revolution [mm].
    #[serde(default = "default_lead_per_revolution")]
    pub lead_per_revolution: f64,
    /// Lower travel bound [mm, machine coordinates].
    #[serde(default = "default_min_position")]
    pub min_position: f64,
    /// Upper travel bound [mm, machine coordinates].
    #[serde(default = "default_max_position")]
    pub max_position: f64,
    #[serde(default)]
    pub pins: PinConfig,
    #[serde(default)]
    pub speeds: SpeedConfig,
    #[serde(default)]
    pub travel: TravelConfig,
}

fn default_steps_per_revolution() -> f64 {
    DEFAULT_STEPS_PER_REVOLUTION
}
fn default_microsteps() -> f64 {
    DEFAULT_MICROSTEPS
}
fn default_lead_per_revolution() -> f64 {
    DEFAULT_LEAD_PER_REVOLUTION
}
fn default_min_position() -> f64 {
    DEFAULT_MIN_POSITION
}
fn default_max_position() -> f64 {
    DEFAULT_MAX_POSITION
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: DEFAULT_STEPS_PER_REVOLUTION,
            microsteps: DEFAULT_MICROSTEPS,
            lead_per_revolution: DEFAULT_LEAD_PER_REVOLUTION,
            min_position: DEFAULT_MIN_POSITION,
            max_position: DEFAULT_MAX_POSITION,
            pins: PinConfig::default(),
            speeds: SpeedConfig::default(),
            travel: TravelConfig::default(),
        }
    }
}

impl AxisConfig {
    /// Step/millimetre conversion for this geometry.
    #[inline]
    pub fn units(&self) -> StepConversion {
        StepConversion::new(
            self.steps_per_revolution,
            self.microsteps,
            self.lead_per_revolution,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.units().validate()?;
        if !self.min_position.is_finite() || !self.max_position.is_finite() {
            return Err(ConfigError::ValidationError(
                "travel bounds must be finite".to_string(),
            ));
        }
        if self.min_position >= self.max_position {
            return Err(ConfigError::ValidationError(format!(
                "min_position ({}) must be below max_position ({})",
                self.min_position, self.max_position
            )));
        }
        self.pins.validate()?;
        self.speeds.validate()?;
        self.travel.validate()
    }
}

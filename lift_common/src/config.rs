//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load the TOML configuration
//! of the router lift.
//!
//! # Usage
//!
//! ```rust,no_run
//! use lift_common::config::{ConfigError, LiftConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = LiftConfig::load_validated(Path::new("config/lift.toml"))?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::axis::config::AxisConfig;
use crate::consts::DEFAULT_CYCLE_TIME_US;

/// Why `lift.toml` could not be turned into a usable [`LiftConfig`].
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// No file at the given path.
    #[error("lift configuration {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// Unreadable file or malformed TOML.
    #[error("lift configuration unreadable: {0}")]
    ParseError(String),

    /// Well-formed TOML describing an impossible lift (inverted bounds,
    /// shared pins, non-positive speeds, ...).
    #[error("invalid lift configuration: {0}")]
    ValidationError(String),
}

/// `[shared] log_level`, lowercase in TOML.
///
/// The `--verbose` flag and `RUST_LOG` both take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-step stepper output.
    Trace,
    /// Sequence transitions and interlock holds.
    Debug,
    /// Commands, completions and run statistics.
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common fields shared by every lift application.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "router-lift-01"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reads a TOML file straight into any deserialisable config section.
///
/// A missing file is reported as [`ConfigError::FileNotFound`] with its path;
/// every other I/O or syntax problem becomes [`ConfigError::ParseError`].
/// No semantic validation happens here.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
            _ => ConfigError::ParseError(format!("{}: {e}", path.display())),
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

/// Control-loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Period between two controller ticks [µs].
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,
}

fn default_cycle_time_us() -> u32 {
    DEFAULT_CYCLE_TIME_US
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_time_us: DEFAULT_CYCLE_TIME_US,
        }
    }
}

impl CycleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_time_us == 0 {
            return Err(ConfigError::ValidationError(
                "cycle.cycle_time_us must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Physical layout of the simulated lift [mm, frame coordinates].
///
/// Frame coordinates are fixed to the machine body; the controller's own
/// coordinates are only related to them once homing has found the minimum
/// endstop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Carriage position at power-up.
    #[serde(default = "default_carriage_start")]
    pub carriage_start: f64,
    /// Minimum endstop closes at or below this position.
    #[serde(default)]
    pub endstop_min: f64,
    /// Maximum endstop closes at or above this position.
    #[serde(default = "default_endstop_max")]
    pub endstop_max: f64,
    /// Probe closes at or above this position.
    #[serde(default = "default_probe_contact")]
    pub probe_contact: f64,
    /// Whether a probe plate is on the table at all.
    #[serde(default = "default_probe_fitted")]
    pub probe_fitted: bool,
    /// Mechanical stop below the minimum endstop.
    #[serde(default = "default_hard_stop_min")]
    pub hard_stop_min: f64,
    /// Mechanical stop above the maximum endstop.
    #[serde(default = "default_hard_stop_max")]
    pub hard_stop_max: f64,
}

fn default_carriage_start() -> f64 {
    40.0
}
fn default_endstop_max() -> f64 {
    119.5
}
fn default_probe_contact() -> f64 {
    62.5
}
fn default_probe_fitted() -> bool {
    true
}
fn default_hard_stop_min() -> f64 {
    -2.0
}
fn default_hard_stop_max() -> f64 {
    122.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            carriage_start: default_carriage_start(),
            endstop_min: 0.0,
            endstop_max: default_endstop_max(),
            probe_contact: default_probe_contact(),
            probe_fitted: true,
            hard_stop_min: default_hard_stop_min(),
            hard_stop_max: default_hard_stop_max(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.hard_stop_min < self.endstop_min
            && self.endstop_min < self.endstop_max
            && self.endstop_max < self.hard_stop_max)
        {
            return Err(ConfigError::ValidationError(
                "simulation layout must satisfy hard_stop_min < endstop_min < endstop_max < hard_stop_max"
                    .to_string(),
            ));
        }
        if self.carriage_start < self.hard_stop_min || self.carriage_start > self.hard_stop_max {
            return Err(ConfigError::ValidationError(format!(
                "simulation.carriage_start ({}) lies outside the hard stops",
                self.carriage_start
            )));
        }
        Ok(())
    }
}

/// Root of `lift.toml`.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// service_name = "router-lift"
///
/// [axis]
/// max_position = 119.0
///
/// [cycle]
/// cycle_time_us = 1000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiftConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub axis: AxisConfig,
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl LiftConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a file and run every validation rule.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        debug!(
            "Loaded {} (steps/mm={}, travel {}..{} mm)",
            path.display(),
            config.axis.units().steps_per_mm(),
            config.axis.min_position,
            config.axis.max_position
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.axis.validate()?;
        self.cycle.validate()?;
        self.simulation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_log_level_deserialization() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct TestWrapper {
            level: LogLevel,
        }

        assert_eq!(
            toml::from_str::<TestWrapper>("level = \"trace\"")
                .unwrap()
                .level,
            LogLevel::Trace
        );
        assert_eq!(
            toml::from_str::<TestWrapper>("level = \"warn\"")
                .unwrap()
                .level,
            LogLevel::Warn
        );
        assert_eq!(LogLevel::Debug.as_directive(), "debug");
    }

    #[test]
    fn test_shared_config_validation_empty_service_name() {
        let config = SharedConfig {
            log_level: LogLevel::Info,
            service_name: "".to_string(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_loader_file_not_found() {
        let path = Path::new("/nonexistent/path/lift.toml");
        let err = LiftConfig::load_validated(path).unwrap_err();
        assert!(matches!(&err, ConfigError::FileNotFound(p) if p == path));
        assert!(err.to_string().contains("/nonexistent/path/lift.toml"));
    }

    #[test]
    fn test_config_loader_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid toml {{{{").unwrap();

        let result = LiftConfig::load_validated(file.path());
        match result {
            Err(ConfigError::ParseError(msg)) => {
                assert!(msg.contains(&file.path().display().to_string()))
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[shared]
service_name = "lift-test"
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = LiftConfig::load_validated(file.path()).unwrap();
        assert_eq!(config.shared.log_level, LogLevel::Info);
        assert_eq!(config.axis, AxisConfig::default());
        assert_eq!(config.cycle.cycle_time_us, DEFAULT_CYCLE_TIME_US);
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = LiftConfig::from_toml_str(
            r#"
[shared]
log_level = "debug"
service_name = "lift-test"

[axis]
steps_per_revolution = 200.0
microsteps = 16.0
lead_per_revolution = 4.0
max_position = 100.0

[axis.pins]
probe = 5
probe_level = "high"

[cycle]
cycle_time_us = 500

[simulation]
carriage_start = 10.0
probe_contact = 50.0
"#,
        )
        .unwrap();
        assert_eq!(config.axis.units().steps_per_mm(), 800.0);
        assert_eq!(config.axis.pins.probe, 5);
        assert_eq!(config.cycle.cycle_time_us, 500);
        assert_eq!(config.simulation.probe_contact, 50.0);
        assert!(config.simulation.probe_fitted);
    }

    #[test]
    fn test_validation_reaches_axis() {
        let result = LiftConfig::from_toml_str(
            r#"
[shared]
service_name = "lift-test"

[axis]
min_position = 10.0
max_position = 5.0
"#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_zero_cycle_time_rejected() {
        let result = LiftConfig::from_toml_str(
            r#"
[shared]
service_name = "lift-test"

[cycle]
cycle_time_us = 0
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_simulation_layout_order() {
        let mut sim = SimulationConfig::default();
        assert!(sim.validate().is_ok());
        sim.endstop_max = -5.0;
        assert!(sim.validate().is_err());
        let mut sim = SimulationConfig::default();
        sim.carriage_start = 500.0;
        assert!(sim.validate().is_err());
    }
}

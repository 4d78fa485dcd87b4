//! Default machine constants.
//!
//! Speeds are in mm/s, accelerations in mm/s², distances in mm unless the
//! name says otherwise. These are only defaults; every value can be
//! overridden from `lift.toml`.

use static_assertions::const_assert;

/// Default control-loop period in microseconds.
pub const DEFAULT_CYCLE_TIME_US: u32 = 1000;

// ─── Speeds ─────────────────────────────────────────────────────────

/// Fast approach speed towards the minimum endstop.
pub const DEFAULT_HOMING_SPEED: f64 = 15.0;

/// Fast approach speed towards the probe plate.
pub const DEFAULT_PROBE_SPEED: f64 = 8.0;

/// Speed for target moves and backoff retractions.
pub const DEFAULT_TRAVEL_SPEED: f64 = 20.0;

/// Acceleration applied to every move.
pub const DEFAULT_ACCELERATION: f64 = 100.0;

/// Speed limit in steps/s programmed into the motion primitive at start-up,
/// before any sequence sets its own.
pub const DEFAULT_INITIAL_SPEED_LIMIT: f64 = 1000.0;

/// Slow approaches run at the homing speed divided by this.
pub const SLOW_APPROACH_DIVISOR: f64 = 2.0;

/// Step increment issued per slow-approach command.
pub const CREEP_STEPS: i64 = 1;

// ─── Travel Bounds ──────────────────────────────────────────────────

/// Longest fast homing run before the endstop is declared dead.
pub const DEFAULT_MAX_HOME_DISTANCE: f64 = 120.0;

/// Longest fast probing run before the workpiece is declared missing.
pub const DEFAULT_MAX_PROBE_DISTANCE: f64 = 120.0;

/// Retraction off a triggered switch before the slow re-approach.
pub const DEFAULT_BACKOFF_DISTANCE: f64 = 3.0;

// ─── Geometry ───────────────────────────────────────────────────────

/// Full steps per motor revolution.
pub const DEFAULT_STEPS_PER_REVOLUTION: f64 = 200.0;

/// Driver microstep setting.
pub const DEFAULT_MICROSTEPS: f64 = 8.0;

/// Spindle lead per revolution [mm].
pub const DEFAULT_LEAD_PER_REVOLUTION: f64 = 8.0;

/// Lower travel bound [mm].
pub const DEFAULT_MIN_POSITION: f64 = 0.0;

/// Upper travel bound [mm].
pub const DEFAULT_MAX_POSITION: f64 = 119.0;

const_assert!(DEFAULT_BACKOFF_DISTANCE < DEFAULT_MAX_HOME_DISTANCE);
const_assert!(DEFAULT_BACKOFF_DISTANCE < DEFAULT_MAX_PROBE_DISTANCE);
const_assert!(DEFAULT_MIN_POSITION < DEFAULT_MAX_POSITION);
const_assert!(SLOW_APPROACH_DIVISOR >= 1.0);

//! Sequence state machines.
//!
//! Homing and probing are each a single transition function over their
//! state tag, evaluated once per tick against a fresh switch reading. The
//! functions issue motion themselves and report completion or faults back
//! to the controller, which owns the position/offset model.

pub mod homing;
pub mod probing;

use lift_common::axis::config::AxisConfig;
use lift_common::axis::fault::FaultReason;
use lift_common::consts::CREEP_STEPS;

// ─── Switch Sample ──────────────────────────────────────────────────

/// Logical switch states sampled at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct SwitchSample {
    /// Minimum endstop closed.
    pub endstop_min: bool,
    /// Maximum endstop closed.
    pub endstop_max: bool,
    /// Probe in contact.
    pub probe: bool,
}

// ─── Sequence Profile ───────────────────────────────────────────────

/// Speeds and distances of one sequence, pre-converted to steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceProfile {
    /// Fast approach [steps/s].
    pub approach_speed: f64,
    /// Single-step creep [steps/s].
    pub creep_speed: f64,
    /// Backoff retraction [steps/s].
    pub retract_speed: f64,
    /// Travel bound of the fast approach [steps, unsigned].
    pub max_travel: i64,
    /// Retraction length [steps, unsigned].
    pub backoff: i64,
    /// Creep increment [steps, unsigned].
    pub creep: i64,
}

impl SequenceProfile {
    /// Homing profile: fast approach at homing speed over the home bound.
    pub fn homing(config: &AxisConfig) -> Self {
        let units = config.units();
        Self {
            approach_speed: units.rate_to_steps(config.speeds.homing),
            creep_speed: units.rate_to_steps(config.speeds.creep()),
            retract_speed: units.rate_to_steps(config.speeds.travel),
            max_travel: units.mm_to_steps(config.travel.max_home_distance),
            backoff: units.mm_to_steps(config.travel.backoff_distance),
            creep: CREEP_STEPS,
        }
    }

    /// Probing profile: fast approach at probe speed over the probe bound.
    pub fn probing(config: &AxisConfig) -> Self {
        let units = config.units();
        Self {
            approach_speed: units.rate_to_steps(config.speeds.probe),
            max_travel: units.mm_to_steps(config.travel.max_probe_distance),
            ..Self::homing(config)
        }
    }
}

// ─── Transition Result ──────────────────────────────────────────────

/// Terminal event produced by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// Sequence reached `Finished` this tick.
    Completed,
    /// Sequence entered `Error` this tick.
    Faulted(FaultReason),
}

/// Result of evaluating one sequence for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S> {
    /// State after this tick.
    pub next: S,
    /// Set only on the tick the sequence terminates.
    pub outcome: Option<SequenceOutcome>,
}

impl<S> Transition<S> {
    #[inline]
    pub(crate) fn to(next: S) -> Self {
        Self {
            next,
            outcome: None,
        }
    }

    #[inline]
    pub(crate) fn completed(next: S) -> Self {
        Self {
            next,
            outcome: Some(SequenceOutcome::Completed),
        }
    }

    #[inline]
    pub(crate) fn faulted(next: S, reason: FaultReason) -> Self {
        Self {
            next,
            outcome: Some(SequenceOutcome::Faulted(reason)),
        }
    }
}

// ─── Test Doubles ───────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_convert_to_steps() {
        let config = AxisConfig::default();
        let homing = SequenceProfile::homing(&config);
        assert_eq!(homing.approach_speed, 3000.0);
        assert_eq!(homing.creep_speed, 1500.0);
        assert_eq!(homing.retract_speed, 4000.0);
        assert_eq!(homing.max_travel, 24_000);
        assert_eq!(homing.backoff, 600);
        assert_eq!(homing.creep, 1);

        let probing = SequenceProfile::probing(&config);
        assert_eq!(probing.approach_speed, 1600.0);
        assert_eq!(probing.creep_speed, homing.creep_speed);
        assert_eq!(probing.max_travel, 24_000);
    }
}

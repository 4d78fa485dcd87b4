//! Trapezoidal-profile step generator.
//!
//! Each `advance()` simulates one control period: the speed ramps by
//! `acceleration * dt` towards the limit (or towards zero once the stopping
//! distance covers what is left), and whole steps are emitted as the
//! fractional position accumulates. A move never overshoots its target.

use lift_common::hal::MotionPrimitive;
use std::time::Duration;
use tracing::{debug, trace};

use super::carriage::Carriage;

/// Simulated stepper driver moving a [`Carriage`].
#[derive(Debug)]
pub struct SimStepper {
    /// Logical step counter.
    position: i64,
    target: i64,
    /// Signed speed [steps/s].
    speed: f64,
    max_speed: f64,
    acceleration: f64,
    /// Control period [s].
    dt: f64,
    /// Sub-step travel carried into the next period.
    fraction: f64,
    carriage: Carriage,
    /// Steps commanded into a hard stop.
    lost_steps: u64,
}

impl SimStepper {
    /// Create a stepper at logical position 0, stepped once per `cycle`.
    pub fn new(carriage: Carriage, cycle: Duration) -> Self {
        Self {
            position: 0,
            target: 0,
            speed: 0.0,
            max_speed: 1.0,
            acceleration: 1.0,
            dt: cycle.as_secs_f64(),
            fraction: 0.0,
            carriage,
            lost_steps: 0,
        }
    }

    /// Current signed speed [steps/s].
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Configured speed limit [steps/s].
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Absolute target [steps].
    pub fn target(&self) -> i64 {
        self.target
    }

    /// Steps the carriage could not follow because it sat on a hard stop.
    pub fn lost_steps(&self) -> u64 {
        self.lost_steps
    }

    fn halt(&mut self) {
        self.speed = 0.0;
        self.fraction = 0.0;
    }

    fn emit(&mut self, steps: i64) {
        self.position += steps;
        let travelled = self.carriage.displace(steps);
        if travelled != steps {
            if self.lost_steps == 0 {
                debug!(
                    "Carriage stalled at hard stop (logical position {})",
                    self.position
                );
            }
            self.lost_steps += (steps - travelled).unsigned_abs();
        }
    }
}

impl MotionPrimitive for SimStepper {
    fn set_speed_limit(&mut self, steps_per_sec: f64) {
        self.max_speed = steps_per_sec.abs().max(f64::MIN_POSITIVE);
        self.speed = self.speed.clamp(-self.max_speed, self.max_speed);
    }

    fn set_acceleration(&mut self, steps_per_sec2: f64) {
        self.acceleration = steps_per_sec2.abs().max(f64::MIN_POSITIVE);
    }

    fn move_by(&mut self, delta_steps: i64) {
        self.target = self.position + delta_steps;
    }

    fn move_to(&mut self, abs_steps: i64) {
        self.target = abs_steps;
    }

    fn advance(&mut self) {
        let distance = self.target - self.position;
        if distance == 0 && self.speed == 0.0 {
            return;
        }

        let dv = self.acceleration * self.dt;
        let direction = distance.signum() as f64;
        let stopping_distance = self.speed * self.speed / (2.0 * self.acceleration);
        let heading_away = distance == 0 || self.speed * direction < 0.0;

        if heading_away || stopping_distance >= distance.abs() as f64 {
            if self.speed.abs() <= dv {
                self.speed = 0.0;
            } else {
                self.speed -= self.speed.signum() * dv;
            }
        } else {
            self.speed = (self.speed + direction * dv).clamp(-self.max_speed, self.max_speed);
        }

        // Short moves decelerate to nothing before arriving; keep creeping.
        if self.speed == 0.0 && distance != 0 {
            self.speed = direction * dv.min(self.max_speed);
        }

        self.fraction += self.speed * self.dt;
        let mut steps = self.fraction.trunc() as i64;
        self.fraction -= steps as f64;

        if distance != 0 && steps.signum() == distance.signum() && steps.abs() >= distance.abs() {
            steps = distance;
            self.halt();
        }
        if steps != 0 {
            trace!("advance {steps} steps -> {}", self.position + steps);
            self.emit(steps);
        }
    }

    fn is_moving(&self) -> bool {
        self.speed != 0.0 || self.position != self.target
    }

    fn distance_remaining(&self) -> i64 {
        self.target - self.position
    }

    fn current_position(&self) -> i64 {
        self.position
    }

    fn set_current_position(&mut self, steps: i64) {
        self.position = steps;
        self.target = steps;
        self.halt();
    }

    fn stop(&mut self) {
        self.target = self.position;
        self.halt();
    }
}

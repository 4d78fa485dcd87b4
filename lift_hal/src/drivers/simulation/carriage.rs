//! Physical carriage model.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Physical position of the lift carriage [steps, frame coordinates].
///
/// The stepper's logical counter is re-zeroed by homing; the carriage keeps
/// the fixed frame coordinate the switches are mounted in. Written only by
/// the stepper, read lock-free by the switches and the `SimHandle`.
#[derive(Debug, Clone)]
pub struct Carriage {
    position: Arc<AtomicI64>,
    hard_stop_min: i64,
    hard_stop_max: i64,
}

impl Carriage {
    /// Create a carriage at `start`, confined to `[hard_stop_min, hard_stop_max]`.
    pub fn new(start: i64, hard_stop_min: i64, hard_stop_max: i64) -> Self {
        Self {
            position: Arc::new(AtomicI64::new(start.clamp(hard_stop_min, hard_stop_max))),
            hard_stop_min,
            hard_stop_max,
        }
    }

    /// Current position.
    #[inline]
    pub fn position(&self) -> i64 {
        self.position.load(Ordering::Acquire)
    }

    /// Apply a commanded displacement. The carriage stalls at the hard stops;
    /// returns the steps actually travelled.
    pub fn displace(&self, steps: i64) -> i64 {
        let from = self.position();
        let to = from
            .saturating_add(steps)
            .clamp(self.hard_stop_min, self.hard_stop_max);
        self.position.store(to, Ordering::Release);
        to - from
    }

    /// Whether the carriage sits on either mechanical stop.
    #[inline]
    pub fn at_hard_stop(&self) -> bool {
        let pos = self.position();
        pos <= self.hard_stop_min || pos >= self.hard_stop_max
    }
}

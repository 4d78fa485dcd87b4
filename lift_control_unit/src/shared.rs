//! Cross-context "is running" flag.
//!
//! A timer interrupt or status thread may need to know whether the axis is
//! moving without touching the controller. The controller publishes the
//! motion primitive's running state once per tick; readers only load.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Writer side, owned by the controller.
#[derive(Debug, Default)]
pub struct MotionFlag {
    running: Arc<AtomicBool>,
}

impl MotionFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the running state observed at the end of a tick.
    #[inline]
    pub(crate) fn publish(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    /// Create a read-only handle. Any number may exist.
    pub fn reader(&self) -> MotionFlagReader {
        MotionFlagReader {
            running: Arc::clone(&self.running),
        }
    }
}

/// Read-only view of a [`MotionFlag`].
#[derive(Debug, Clone)]
pub struct MotionFlagReader {
    running: Arc<AtomicBool>,
}

impl MotionFlagReader {
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

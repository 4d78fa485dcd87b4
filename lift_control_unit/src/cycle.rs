//! Periodic driver: one `tick()` per control period.
//!
//! ## RT Setup
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)` - lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity` - pin to one CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)` - RT priority.
//!
//! All four are no-ops without the `rt` feature.
//!
//! ## Pacing
//! Paced runners sleep to an absolute deadline advanced by one period per
//! cycle, so jitter does not accumulate. Unpaced runners tick back to back
//! (tests, benches, simulation fast-forward).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use lift_common::config::CycleConfig;
use lift_common::hal::{DigitalInputs, MotionPrimitive};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::controller::AxisController;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    pub min_cycle_ns: i64,
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Cycles whose body took longer than the period.
    pub overruns: u64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
        }
    }

    /// Record a cycle duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, budget_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns = self.sum_cycle_ns.saturating_add(duration_ns);
        if duration_ns > budget_ns {
            self.overruns += 1;
        }
    }

    /// Average cycle time [ns] (returns 0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors during RT setup or cycle execution.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("RT setup error: {0}")]
    RtSetup(String),
    /// The awaited condition did not hold within the cycle bound.
    #[error("condition not reached within {cycles} cycles")]
    Timeout { cycles: u64 },
    /// The stop flag was raised (e.g. Ctrl-C).
    #[error("stopped after {cycles} cycles")]
    Stopped { cycles: u64 },
}

// ─── RT Setup ───────────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 256 KiB of stack so the loop does not fault pages in.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, aligned, exclusive reference.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Perform the RT setup sequence. Call before the first paced cycle.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    if cfg!(feature = "rt") {
        info!("RT setup complete (cpu_core={cpu_core}, priority={rt_priority})");
    } else {
        debug!("RT setup skipped (built without `rt`)");
    }
    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Drives an [`AxisController`] at a fixed period.
pub struct CycleRunner<M, I> {
    controller: AxisController<M, I>,
    period: Duration,
    paced: bool,
    stop: Arc<AtomicBool>,
    stats: CycleStats,
    next_deadline: Option<Instant>,
}

impl<M: MotionPrimitive, I: DigitalInputs> CycleRunner<M, I> {
    /// Unpaced runner with the configured period.
    pub fn new(controller: AxisController<M, I>, config: &CycleConfig) -> Self {
        Self {
            controller,
            period: Duration::from_micros(u64::from(config.cycle_time_us)),
            paced: false,
            stop: Arc::new(AtomicBool::new(false)),
            stats: CycleStats::new(),
            next_deadline: None,
        }
    }

    /// Sleep to the cycle deadline after each tick.
    pub fn paced(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// Flag that ends `run_until` with [`CycleError::Stopped`] when set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn controller(&self) -> &AxisController<M, I> {
        &self.controller
    }

    /// Commands go through here between runs.
    pub fn controller_mut(&mut self) -> &mut AxisController<M, I> {
        &mut self.controller
    }

    pub fn into_controller(self) -> AxisController<M, I> {
        self.controller
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Execute one cycle: tick, record timing, wait for the deadline.
    pub fn run_cycle(&mut self) {
        let start = Instant::now();
        self.controller.tick();
        let elapsed = start.elapsed();
        let budget_ns = self.period.as_nanos() as i64;
        let elapsed_ns = elapsed.as_nanos() as i64;
        if self.paced && elapsed_ns > budget_ns {
            warn!("Cycle overrun: {elapsed_ns}ns > {budget_ns}ns budget");
        }
        self.stats.record(elapsed_ns, budget_ns);

        if self.paced {
            let deadline = self.next_deadline.unwrap_or(start) + self.period;
            let now = Instant::now();
            if deadline > now {
                std::thread::sleep(deadline - now);
                self.next_deadline = Some(deadline);
            } else {
                // Late: restart the schedule instead of bursting to catch up.
                self.next_deadline = Some(now);
            }
        }
    }

    /// Tick until `done` holds, checked before every cycle.
    ///
    /// Returns the number of cycles run.
    pub fn run_until(
        &mut self,
        mut done: impl FnMut(&AxisController<M, I>) -> bool,
        max_cycles: u64,
    ) -> Result<u64, CycleError> {
        let mut cycles = 0;
        loop {
            if done(&self.controller) {
                return Ok(cycles);
            }
            if self.stop.load(Ordering::Acquire) {
                return Err(CycleError::Stopped { cycles });
            }
            if cycles >= max_cycles {
                return Err(CycleError::Timeout { cycles });
            }
            self.run_cycle();
            cycles += 1;
        }
    }

    /// Run exactly `cycles` cycles unless stopped.
    pub fn run_for(&mut self, cycles: u64) -> Result<(), CycleError> {
        for n in 0..cycles {
            if self.stop.load(Ordering::Acquire) {
                return Err(CycleError::Stopped { cycles: n });
            }
            self.run_cycle();
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

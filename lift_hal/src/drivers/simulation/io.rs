//! Simulated switch inputs and fault injection.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use lift_common::axis::config::PinConfig;
use lift_common::hal::DigitalInputs;
use tracing::debug;

use super::carriage::Carriage;

/// The three simulated inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimInput {
    /// Minimum endstop.
    EndstopMin = 0,
    /// Maximum endstop.
    EndstopMax = 1,
    /// Probe plate contact.
    Probe = 2,
}

/// Failure mode forced onto an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SwitchFault {
    /// Input follows the carriage.
    #[default]
    None = 0,
    /// Input never closes (broken wire, dead switch).
    StuckOpen = 1,
    /// Input always reads closed (welded contact, short).
    StuckClosed = 2,
}

impl SwitchFault {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::StuckOpen,
            2 => Self::StuckClosed,
            _ => Self::None,
        }
    }

    /// Apply the fault to the physical switch state.
    #[inline]
    pub const fn apply(&self, closed: bool) -> bool {
        match self {
            Self::None => closed,
            Self::StuckOpen => false,
            Self::StuckClosed => true,
        }
    }
}

/// Lock-free per-input fault table shared between switches and handles.
#[derive(Debug, Clone, Default)]
pub struct FaultInjector {
    faults: Arc<[AtomicU8; 3]>,
}

impl FaultInjector {
    /// All inputs healthy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force `input` into `fault`.
    pub fn set(&self, input: SimInput, fault: SwitchFault) {
        debug!("Injecting {fault:?} on {input:?}");
        self.faults[input as usize].store(fault as u8, Ordering::Release);
    }

    /// Current fault on `input`.
    pub fn get(&self, input: SimInput) -> SwitchFault {
        SwitchFault::from_u8(self.faults[input as usize].load(Ordering::Acquire))
    }

    /// Return every input to normal operation.
    pub fn clear(&self) {
        for input in [SimInput::EndstopMin, SimInput::EndstopMax, SimInput::Probe] {
            self.faults[input as usize].store(SwitchFault::None as u8, Ordering::Release);
        }
    }
}

/// Endstops and probe derived from the carriage position.
///
/// Emits raw pin levels using the polarity in [`PinConfig`]; reads of any
/// other pin return low.
#[derive(Debug, Clone)]
pub struct SimSwitches {
    carriage: Carriage,
    pins: PinConfig,
    endstop_min: i64,
    endstop_max: i64,
    probe_contact: Option<i64>,
    faults: FaultInjector,
}

impl SimSwitches {
    /// Switch positions are in frame steps, like the carriage.
    pub fn new(
        carriage: Carriage,
        pins: PinConfig,
        endstop_min: i64,
        endstop_max: i64,
        probe_contact: Option<i64>,
        faults: FaultInjector,
    ) -> Self {
        Self {
            carriage,
            pins,
            endstop_min,
            endstop_max,
            probe_contact,
            faults,
        }
    }

    /// Logical (polarity-free) state of `input`.
    pub fn closed(&self, input: SimInput) -> bool {
        let pos = self.carriage.position();
        let physical = match input {
            SimInput::EndstopMin => pos <= self.endstop_min,
            SimInput::EndstopMax => pos >= self.endstop_max,
            SimInput::Probe => self.probe_contact.is_some_and(|contact| pos >= contact),
        };
        self.faults.get(input).apply(physical)
    }

    fn input_for(&self, pin: u8) -> Option<SimInput> {
        if pin == self.pins.endstop_min {
            Some(SimInput::EndstopMin)
        } else if pin == self.pins.endstop_max {
            Some(SimInput::EndstopMax)
        } else if pin == self.pins.probe {
            Some(SimInput::Probe)
        } else {
            None
        }
    }
}

impl DigitalInputs for SimSwitches {
    fn is_high(&self, pin: u8) -> bool {
        let Some(input) = self.input_for(pin) else {
            return false;
        };
        let level = match input {
            SimInput::EndstopMin | SimInput::EndstopMax => self.pins.endstop_level,
            SimInput::Probe => self.pins.probe_level,
        };
        if self.closed(input) {
            level.level_when_active()
        } else {
            !level.level_when_active()
        }
    }
}

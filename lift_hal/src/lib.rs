//! # Router Lift HAL Library
//!
//! Hardware abstraction for the router lift axis.
//!
//! Drivers implement the `MotionPrimitive` and `DigitalInputs` contracts
//! defined in `lift_common::hal`. The axis controller owns one of each and is
//! the only caller of their mutating operations.
//!
//! # Module Structure
//!
//! - [`drivers`] - Driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                    lift_hal (simulation)                  │
//! │  ┌──────────────┐    ┌────────────┐    ┌───────────────┐  │
//! │  │  SimStepper  │───►│  Carriage  │◄───│  SimSwitches  │  │
//! │  │ (Motion…)    │    │ (AtomicI64)│    │ (DigitalIn…)  │  │
//! │  └──────────────┘    └─────▲──────┘    └───────▲───────┘  │
//! │                            │                   │          │
//! │                      ┌─────┴───────────────────┴───┐      │
//! │                      │  SimHandle + FaultInjector  │      │
//! │                      └─────────────────────────────┘      │
//! └───────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod drivers;

pub use crate::drivers::simulation::{
    Carriage, FaultInjector, SimHandle, SimInput, SimStepper, SimSwitches, SimulatedLift,
    SwitchFault,
};

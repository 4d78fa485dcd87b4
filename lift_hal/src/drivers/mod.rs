//! HAL driver implementations.
//!
//! - [`simulation`] - Software simulation of the lift for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `MotionPrimitive` and `DigitalInputs` from `lift_common::hal`
//! 3. Add export and documentation

pub mod simulation;

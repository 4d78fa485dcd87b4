//! Router Lift Common Library
//!
//! This crate provides the types shared by every crate in the router lift
//! workspace: configuration loading, step/millimetre conversion, the state
//! tags of the homing and probing sequences, fault flags and the hardware
//! contracts the axis controller is written against.
//!
//! # Module Structure
//!
//! - [`axis`] - Axis geometry, unit conversion, state tags and fault flags
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Default speeds, distances and cycle timing
//! - [`hal`] - Motion primitive and digital input contracts
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use lift_common::prelude::*;
//!
//! let units = StepConversion::new(200.0, 8.0, 8.0);
//! assert_eq!(units.mm_to_steps(1.0), 200);
//! ```

pub mod axis;
pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;

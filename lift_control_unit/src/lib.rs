//! # Router Lift Control Unit Library
//!
//! Single-axis controller for a motorised router lift. Drives a stepper
//! through homing, surface probing and targeted moves while gating every
//! step against the endstops.
//!
//! ## Layers
//!
//! 1. **Sequences** (`state`) - homing and probing transition functions
//! 2. **Interlock** (`safety`) - per-tick permit to advance the motion primitive
//! 3. **Controller** (`controller`) - position/offset model, commands, queries
//! 4. **Cycle** (`cycle`) - periodic driver calling `tick()` once per period
//!
//! ## Single Owner
//!
//! The controller owns its motion primitive and input reader. Nothing else
//! mutates motion; other threads observe through [`shared::MotionFlagReader`].

pub mod command;
pub mod controller;
pub mod cycle;
pub mod safety;
pub mod shared;
pub mod state;

pub use controller::{AxisController, AxisSnapshot};

//! Single-axis types shared between the controller and its collaborators.
//!
//! Organized by domain: geometry and speed configuration, step/millimetre
//! conversion, sequence state tags and fault flags.

pub mod config;
pub mod fault;
pub mod state;
pub mod units;

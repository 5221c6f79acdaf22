//! Station controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing and fuzzing.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod protocol;
pub mod scheduler;
pub mod station;
pub mod telemetry;

// Adapters and drivers carry a simulation backend on host targets, so
// they compile everywhere.
pub mod adapters;
pub mod drivers;
pub mod pins;

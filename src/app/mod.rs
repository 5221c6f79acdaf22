//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the orchestration for the station controller:
//! command handling, telemetry polling, load control, and the job runner.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod runner;
pub mod service;

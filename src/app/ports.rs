//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ StationService (domain)
//! ```
//!
//! Driven adapters (byte store, clock, charge-controller bus, relays,
//! UDP socket, event sinks) implement these traits.  The
//! [`StationService`](super::service::StationService) consumes them via
//! generics, so the domain core never touches hardware directly.

use std::net::SocketAddr;

use crate::config::StationConfig;
use crate::error::{StorageError, TelemetryError, TransportError};

// ───────────────────────────────────────────────────────────────
// Byte store port (driven adapter: domain ↔ EEPROM-style storage)
// ───────────────────────────────────────────────────────────────

/// Byte-addressed persistent store that survives power loss.
///
/// Offsets are absolute; see [`crate::station::layout`] for the map.
/// Bytes that were never written read back as `0xFF`.
pub trait ByteStore {
    /// Fill `buf` with the bytes starting at `offset`.
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Write `data` starting at `offset`.  Durable once this returns `Ok`.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the station tunables.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`StationConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<StationConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &StationConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: domain ↔ RTC + monotonic timer)
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Wall-clock time as Unix epoch seconds.
    fn now_epoch(&self) -> u32;

    /// Set the wall clock.
    fn set_epoch(&mut self, epoch: u32);

    /// Milliseconds since boot.  Wraps at `u32::MAX`.
    fn uptime_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Register port (driven adapter: domain ← charge controller)
// ───────────────────────────────────────────────────────────────

/// Read-side port onto the charge controller's register file.
pub trait RegisterPort {
    /// Read `out.len()` consecutive input registers starting at `address`.
    fn read_input_registers(&mut self, address: u16, out: &mut [u16])
    -> Result<(), TelemetryError>;
}

// ───────────────────────────────────────────────────────────────
// Relay output port (driven adapter: domain → relay board)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain drives each relay channel through this.
pub trait RelayOutputs {
    /// Energise or release channel `index`.  Out-of-range indices are ignored.
    fn set_energized(&mut self, index: usize, energized: bool);
}

// ───────────────────────────────────────────────────────────────
// Datagram port (driven adapter: domain ↔ UDP)
// ───────────────────────────────────────────────────────────────

pub trait DatagramPort {
    /// Non-blocking receive.  `Ok(None)` when nothing is queued.
    fn try_receive(&mut self, buf: &mut [u8])
    -> Result<Option<(usize, SocketAddr)>, TransportError>;

    /// Send one datagram to `peer`.
    fn send(&mut self, peer: SocketAddr, data: &[u8]) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Restart port (driven adapter: domain → SoC reset)
// ───────────────────────────────────────────────────────────────

pub trait RestartPort {
    /// Reboot the device.  On hardware this does not return.
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`StationEvent`](super::events::StationEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::StationEvent);
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the jobs it runs)
// ───────────────────────────────────────────────────────────────

/// Periodic jobs of the main loop, in the order they are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Poll the UDP socket and dispatch at most one request.
    ReceiveCommand,
    /// Refresh the measurement snapshot from the charge controller.
    ReadMeasurements,
    /// Refresh the decoded device status.
    ReadStatus,
    /// Run the hysteresis step on the current snapshot.
    EvaluateLoad,
    /// Project enable flag and relay bank onto the relay pins.
    ApplyOutputs,
}

impl Job {
    pub const ALL: [Job; 5] = [
        Job::ReceiveCommand,
        Job::ReadMeasurements,
        Job::ReadStatus,
        Job::EvaluateLoad,
        Job::ApplyOutputs,
    ];
}

/// Callback trait that the scheduler invokes when a job is due.
///
/// The [`Scheduler`](crate::scheduler::Scheduler) only keeps time; what a
/// job actually does is decided by the implementor.
pub trait SchedulerDelegate {
    fn on_job_due(&mut self, job: Job);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}

//! Outbound application events.
//!
//! The [`StationService`](super::service::StationService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them (serial log today).

use std::net::SocketAddr;

use heapless::Vec;

use crate::error::{TelemetryError, TransportError};
use crate::protocol::{Command, DATAGRAM_SIZE, Status};
use crate::telemetry::{DeviceStatus, TelemetrySnapshot};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum StationEvent {
    /// The service has loaded its persisted state.
    Started {
        voltage_on: f32,
        voltage_off: f32,
        relays: u8,
    },

    /// A datagram decoded into a request.
    CommandReceived {
        command: Command,
        size: usize,
        peer: SocketAddr,
    },

    /// A response went out; `payload` is the full wire image.
    ResponseSent {
        status: Status,
        peer: SocketAddr,
        payload: Vec<u8, DATAGRAM_SIZE>,
    },

    /// The UDP socket failed.
    TransportFailed(TransportError),

    /// First failed measurement poll after a good one (or at start-up).
    TelemetryLost(TelemetryError),

    /// First good measurement poll after a failure.
    TelemetryRestored(TelemetrySnapshot),

    /// First failed status poll after a good one.
    StatusLost(TelemetryError),

    /// A status block was decoded.
    StatusDecoded(DeviceStatus),

    /// The hysteresis step flipped the global enable flag.
    LoadChanged { enabled: bool, battery_voltage: f32 },

    /// Relay pins were re-driven; bit `i` set = relay `i` energised.
    OutputsApplied(u8),

    /// A Reset command is about to reboot the station.
    RestartRequested,
}

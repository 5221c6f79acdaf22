//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured station events to the
//! ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{debug, info, warn};

use crate::app::events::StationEvent;
use crate::app::ports::EventSink;
use crate::protocol::hex::to_hex;

/// Adapter that logs every [`StationEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &StationEvent) {
        match event {
            StationEvent::Started {
                voltage_on,
                voltage_off,
                relays,
            } => {
                info!(
                    "START | on={:.2}V off={:.2}V | relays=0b{:08b}",
                    voltage_on, voltage_off, relays
                );
            }
            StationEvent::CommandReceived {
                command,
                size,
                peer,
            } => {
                info!("RX    | {} ({} B) from {}", command, size, peer);
            }
            StationEvent::ResponseSent {
                status,
                peer,
                payload,
            } => {
                info!(
                    "TX    | {} ({} B) to {} | {}",
                    status,
                    payload.len(),
                    peer,
                    to_hex(payload)
                );
            }
            StationEvent::TransportFailed(e) => {
                warn!("NET   | {}", e);
            }
            StationEvent::TelemetryLost(e) => {
                warn!("EPEVR | measurements unavailable: {}", e);
            }
            StationEvent::TelemetryRestored(s) => {
                info!(
                    "EPEVR | PV {:.2}V {:.2}A | BATT {:.2}V {:.2}A",
                    s.panel_voltage, s.panel_current, s.battery_voltage, s.battery_charge_current
                );
            }
            StationEvent::StatusLost(e) => {
                warn!("EPEVR | status unavailable: {}", e);
            }
            StationEvent::StatusDecoded(s) => {
                debug!(
                    "EPEVR | wrong_id={} temp={:?} batt={:?} chg={:?} pv={:?} load={:?}",
                    s.wrong_voltage_id, s.temperature, s.battery, s.charging, s.arrays, s.load
                );
            }
            StationEvent::LoadChanged {
                enabled,
                battery_voltage,
            } => {
                info!(
                    "LOAD  | {} at {:.2}V",
                    if *enabled { "enabled" } else { "shed" },
                    battery_voltage
                );
            }
            StationEvent::OutputsApplied(bits) => {
                debug!("RELAY | driven=0b{:08b}", bits);
            }
            StationEvent::RestartRequested => {
                warn!("RESET | restart requested over the wire");
            }
        }
    }
}

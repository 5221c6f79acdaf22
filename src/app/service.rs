//! Application service: the hexagonal core.
//!
//! [`StationService`] owns the [`StationContext`] and exposes one method
//! per periodic job.  All I/O flows through port traits injected at call
//! sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  DatagramPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!  RegisterPort ──▶ │       StationService       │
//!     ClockPort ◀──▶│ dispatcher · hysteresis    │
//!     ByteStore ◀──▶│ relay bank · thresholds    │ ──▶ RelayOutputs
//!                   └────────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::StationConfig;
use crate::control::load::{self, Evaluation};
use crate::protocol::codec::{self, Response};
use crate::protocol::dispatcher;
use crate::station::StationContext;

use super::events::StationEvent;
use super::ports::{ByteStore, ClockPort, DatagramPort, EventSink, RegisterPort, RelayOutputs};

/// Receive buffer; anything past one datagram is dropped by the codec.
const RX_BUFFER_SIZE: usize = 64;

// ───────────────────────────────────────────────────────────────
// StationService
// ───────────────────────────────────────────────────────────────

pub struct StationService {
    ctx: StationContext,
    /// Outcome of the last measurement / status poll (`None` before the
    /// first).  Loss and recovery are reported on transitions only.
    measurements_ok: Option<bool>,
    status_ok: Option<bool>,
}

impl StationService {
    /// Load persisted thresholds and relay states from `store`.
    pub fn new(config: &StationConfig, store: &impl ByteStore) -> Self {
        Self::with_context(StationContext::load(store, config))
    }

    /// Wrap an already-built context.
    pub fn with_context(ctx: StationContext) -> Self {
        Self {
            ctx,
            measurements_ok: None,
            status_ok: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&StationEvent::Started {
            voltage_on: self.ctx.thresholds.voltage_on,
            voltage_off: self.ctx.thresholds.voltage_off,
            relays: self.ctx.relays.bits(),
        });
        info!("StationService started");
    }

    // ── Commands ──────────────────────────────────────────────

    /// Decode and execute one datagram.  Returns `None` for an empty
    /// datagram, which gets no reply.
    pub fn handle_datagram(
        &mut self,
        peer: std::net::SocketAddr,
        datagram: &[u8],
        clock: &mut impl ClockPort,
        store: &mut impl ByteStore,
        sink: &mut impl EventSink,
    ) -> Option<Response> {
        let Some(request) = codec::decode(peer, datagram) else {
            warn!("Dropping empty datagram from {}", peer);
            return None;
        };
        sink.emit(&StationEvent::CommandReceived {
            command: request.command,
            size: datagram.len(),
            peer,
        });
        Some(dispatcher::dispatch(&request, &mut self.ctx, clock, store))
    }

    /// Poll the transport once; if a datagram is queued, dispatch it and
    /// send the reply.  Returns `true` if a datagram was consumed.
    pub fn poll_transport(
        &mut self,
        transport: &mut impl DatagramPort,
        clock: &mut impl ClockPort,
        store: &mut impl ByteStore,
        sink: &mut impl EventSink,
    ) -> bool {
        let mut buf = [0u8; RX_BUFFER_SIZE];
        let (len, peer) = match transport.try_receive(&mut buf) {
            Ok(Some(received)) => received,
            Ok(None) => return false,
            Err(e) => {
                sink.emit(&StationEvent::TransportFailed(e));
                return false;
            }
        };

        if let Some(response) = self.handle_datagram(peer, &buf[..len], clock, store, sink) {
            let payload = codec::encode(&response);
            match transport.send(response.peer, &payload) {
                Ok(()) => sink.emit(&StationEvent::ResponseSent {
                    status: response.status,
                    peer: response.peer,
                    payload,
                }),
                Err(e) => sink.emit(&StationEvent::TransportFailed(e)),
            }
        }
        true
    }

    // ── Telemetry ─────────────────────────────────────────────

    pub fn refresh_measurements(&mut self, bus: &mut impl RegisterPort, sink: &mut impl EventSink) {
        match self.ctx.telemetry.refresh_measurements(bus) {
            Ok(snapshot) => {
                if self.measurements_ok != Some(true) {
                    sink.emit(&StationEvent::TelemetryRestored(*snapshot));
                }
                self.measurements_ok = Some(true);
            }
            Err(e) => {
                if self.measurements_ok != Some(false) {
                    sink.emit(&StationEvent::TelemetryLost(e));
                }
                self.measurements_ok = Some(false);
            }
        }
    }

    pub fn refresh_status(&mut self, bus: &mut impl RegisterPort, sink: &mut impl EventSink) {
        match self.ctx.telemetry.refresh_status(bus) {
            Ok(status) => {
                sink.emit(&StationEvent::StatusDecoded(*status));
                self.status_ok = Some(true);
            }
            Err(e) => {
                if self.status_ok != Some(false) {
                    sink.emit(&StationEvent::StatusLost(e));
                }
                self.status_ok = Some(false);
            }
        }
    }

    // ── Load control ──────────────────────────────────────────

    /// Run the hysteresis step.  No-op while the snapshot is invalid.
    pub fn evaluate_load(&mut self, sink: &mut impl EventSink) -> Evaluation {
        let outcome = load::evaluate(&mut self.ctx);
        if let Evaluation::Changed { to, .. } = outcome {
            sink.emit(&StationEvent::LoadChanged {
                enabled: to,
                battery_voltage: self.ctx.telemetry.snapshot().battery_voltage,
            });
        }
        outcome
    }

    /// Re-drive every relay pin from the enable flag and relay bank.
    pub fn apply_outputs(&self, outputs: &mut impl RelayOutputs, sink: &mut impl EventSink) {
        let driven = load::apply(self.ctx.load_enabled, &self.ctx.relays, outputs);
        sink.emit(&StationEvent::OutputsApplied(driven));
    }

    // ── Restart ───────────────────────────────────────────────

    /// Consume a pending Reset request.
    pub fn take_restart_request(&mut self) -> bool {
        core::mem::take(&mut self.ctx.restart_requested)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn context(&self) -> &StationContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut StationContext {
        &mut self.ctx
    }

    pub fn load_enabled(&self) -> bool {
        self.ctx.load_enabled
    }
}

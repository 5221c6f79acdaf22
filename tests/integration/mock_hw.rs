//! Mock hardware adapters for integration tests.
//!
//! Each mock records what the core did to it so tests can assert on the
//! full history without touching real GPIO, UART or sockets.  The byte
//! store is the library's own host-side [`EepromAdapter`].

use std::collections::VecDeque;
use std::net::SocketAddr;

use stationmgmt::adapters::eeprom::EepromAdapter;
use stationmgmt::app::events::StationEvent;
use stationmgmt::app::ports::{
    ClockPort, DatagramPort, EventSink, RegisterPort, RelayOutputs,
};
use stationmgmt::app::runner::Hardware;
use stationmgmt::error::{TelemetryError, TransportError};
use stationmgmt::station::RELAY_COUNT;
use stationmgmt::telemetry::epever::{MEASUREMENT_BASE, STATUS_BASE};

pub fn peer() -> SocketAddr {
    "10.0.0.7:40000".parse().unwrap()
}

// ── Clock ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockClock {
    pub epoch: u32,
    pub uptime_ms: u32,
}

impl ClockPort for MockClock {
    fn now_epoch(&self) -> u32 {
        self.epoch
    }

    fn set_epoch(&mut self, epoch: u32) {
        self.epoch = epoch;
    }

    fn uptime_ms(&self) -> u32 {
        self.uptime_ms
    }
}

// ── Charge controller bus ─────────────────────────────────────

/// Register file of a healthy charge controller; `offline` makes every
/// read time out.
#[derive(Debug)]
pub struct MockBus {
    pub measurements: [u16; 6],
    pub status: [u16; 3],
    pub offline: bool,
    pub reads: Vec<u16>,
}

#[allow(dead_code)]
impl MockBus {
    pub fn with_battery(volts: f32) -> Self {
        let mut bus = Self {
            measurements: [1850, 312, 0, 0, 0, 275],
            status: [0x0000, 0x0004, 0x1000],
            offline: false,
            reads: Vec::new(),
        };
        bus.set_battery(volts);
        bus
    }

    pub fn set_battery(&mut self, volts: f32) {
        self.measurements[4] = (volts * 100.0).round() as u16;
    }
}

impl RegisterPort for MockBus {
    fn read_input_registers(
        &mut self,
        address: u16,
        out: &mut [u16],
    ) -> Result<(), TelemetryError> {
        self.reads.push(address);
        if self.offline {
            return Err(TelemetryError::Timeout);
        }
        let block: &[u16] = match address {
            MEASUREMENT_BASE => &self.measurements,
            STATUS_BASE => &self.status,
            _ => return Err(TelemetryError::Exception(0x02)),
        };
        if out.len() != block.len() {
            return Err(TelemetryError::Exception(0x03));
        }
        out.copy_from_slice(block);
        Ok(())
    }
}

// ── Relay board ───────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockRelays {
    pub levels: [bool; RELAY_COUNT],
    pub writes: usize,
}

#[allow(dead_code)]
impl MockRelays {
    pub fn energized_bits(&self) -> u8 {
        self.levels
            .iter()
            .enumerate()
            .fold(0, |acc, (i, on)| acc | (u8::from(*on) << i))
    }
}

impl RelayOutputs for MockRelays {
    fn set_energized(&mut self, index: usize, energized: bool) {
        if let Some(level) = self.levels.get_mut(index) {
            *level = energized;
            self.writes += 1;
        }
    }
}

// ── UDP ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockTransport {
    pub inbox: VecDeque<(Vec<u8>, SocketAddr)>,
    pub outbox: Vec<(Vec<u8>, SocketAddr)>,
    pub fail_send: bool,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn queue(&mut self, datagram: &[u8]) {
        self.inbox.push_back((datagram.to_vec(), peer()));
    }
}

impl DatagramPort for MockTransport {
    fn try_receive(
        &mut self,
        buf: &mut [u8],
    ) -> Result<Option<(usize, SocketAddr)>, TransportError> {
        let Some((datagram, from)) = self.inbox.pop_front() else {
            return Ok(None);
        };
        let len = datagram.len().min(buf.len());
        buf[..len].copy_from_slice(&datagram[..len]);
        Ok(Some((len, from)))
    }

    fn send(&mut self, peer: SocketAddr, data: &[u8]) -> Result<(), TransportError> {
        if self.fail_send {
            return Err(TransportError::SendFailed);
        }
        self.outbox.push((data.to_vec(), peer));
        Ok(())
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<StationEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&StationEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &StationEvent) {
        self.events.push(event.clone());
    }
}

// ── Bundle ────────────────────────────────────────────────────

pub type MockHardware = Hardware<EepromAdapter, MockClock, MockBus, MockRelays, MockTransport>;

pub fn hardware(bus: MockBus) -> MockHardware {
    Hardware::new(
        EepromAdapter::blank(),
        MockClock::default(),
        bus,
        MockRelays::default(),
        MockTransport::default(),
    )
}

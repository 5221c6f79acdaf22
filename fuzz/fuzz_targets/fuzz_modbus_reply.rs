//! Fuzz target: Modbus RTU reply parsing
//!
//! Replays arbitrary bytes as the charge controller's answer to a
//! measurement-block read.  The client must return a typed
//! `TelemetryError` or exactly the requested registers, never panic.
//!
//! cargo fuzz run fuzz_modbus_reply

#![no_main]

use libfuzzer_sys::fuzz_target;
use stationmgmt::adapters::modbus::{ModbusClient, SerialLink};
use stationmgmt::app::ports::RegisterPort;
use stationmgmt::error::TelemetryError;
use stationmgmt::telemetry::epever::{MEASUREMENT_BASE, MEASUREMENT_COUNT};

struct Replay<'a> {
    data: &'a [u8],
}

impl SerialLink for Replay<'_> {
    fn transmit(&mut self, _frame: &[u8]) -> Result<(), TelemetryError> {
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8], _timeout_ms: u32) -> Result<usize, TelemetryError> {
        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

fuzz_target!(|data: &[u8]| {
    let mut client = ModbusClient::new(Replay { data }, 1, 100);
    let mut regs = [0u16; MEASUREMENT_COUNT];
    let _ = client.read_input_registers(MEASUREMENT_BASE, &mut regs);
});

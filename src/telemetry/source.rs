//! Cached view of the charge controller.
//!
//! [`TelemetrySource`] owns the last measurement snapshot and the last
//! decoded status.  Each `refresh_*` call polls one register block
//! through a [`RegisterPort`] and atomically replaces the cached value:
//! the decoded block on success, the explicit invalid value on failure.

use crate::app::ports::RegisterPort;
use crate::error::TelemetryError;

use super::epever::{
    MEASUREMENT_BASE, MEASUREMENT_COUNT, STATUS_BASE, STATUS_COUNT, decode_measurements,
    decode_status,
};
use super::{DeviceStatus, TelemetrySnapshot};

#[derive(Debug, Clone, Default)]
pub struct TelemetrySource {
    snapshot: TelemetrySnapshot,
    status: DeviceStatus,
}

impl TelemetrySource {
    /// Both caches start invalid until the first successful poll.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &TelemetrySnapshot {
        &self.snapshot
    }

    pub fn status(&self) -> &DeviceStatus {
        &self.status
    }

    /// Poll the measurement block.
    pub fn refresh_measurements(
        &mut self,
        port: &mut impl RegisterPort,
    ) -> Result<&TelemetrySnapshot, TelemetryError> {
        let mut regs = [0u16; MEASUREMENT_COUNT];
        match port.read_input_registers(MEASUREMENT_BASE, &mut regs) {
            Ok(()) => {
                self.snapshot = decode_measurements(&regs);
                Ok(&self.snapshot)
            }
            Err(e) => {
                self.snapshot = TelemetrySnapshot::INVALID;
                Err(e)
            }
        }
    }

    /// Poll the status block.
    pub fn refresh_status(
        &mut self,
        port: &mut impl RegisterPort,
    ) -> Result<&DeviceStatus, TelemetryError> {
        let mut regs = [0u16; STATUS_COUNT];
        match port.read_input_registers(STATUS_BASE, &mut regs) {
            Ok(()) => {
                self.status = decode_status(&regs);
                Ok(&self.status)
            }
            Err(e) => {
                self.status = DeviceStatus::INVALID;
                Err(e)
            }
        }
    }

    /// Overwrite the cached snapshot.  Used by tests and simulation.
    pub fn set_snapshot(&mut self, snapshot: TelemetrySnapshot) {
        self.snapshot = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Register file that answers from a fixed table or fails.
    struct FakeBus {
        measurements: [u16; MEASUREMENT_COUNT],
        status: [u16; STATUS_COUNT],
        fail: Option<TelemetryError>,
    }

    impl RegisterPort for FakeBus {
        fn read_input_registers(
            &mut self,
            address: u16,
            out: &mut [u16],
        ) -> Result<(), TelemetryError> {
            if let Some(e) = self.fail {
                return Err(e);
            }
            match address {
                MEASUREMENT_BASE => out.copy_from_slice(&self.measurements),
                STATUS_BASE => out.copy_from_slice(&self.status),
                _ => return Err(TelemetryError::Exception(0x02)),
            }
            Ok(())
        }
    }

    fn bus() -> FakeBus {
        FakeBus {
            measurements: [1800, 150, 0, 0, 2500, 120],
            status: [0x0001, 0x0004, 0x1000],
            fail: None,
        }
    }

    #[test]
    fn starts_invalid() {
        let src = TelemetrySource::new();
        assert!(!src.snapshot().valid);
        assert!(!src.status().valid);
    }

    #[test]
    fn successful_poll_replaces_snapshot() {
        let mut src = TelemetrySource::new();
        let snap = *src.refresh_measurements(&mut bus()).unwrap();
        assert!(snap.valid);
        assert!((snap.battery_voltage - 25.0).abs() < 1e-4);
        assert_eq!(src.snapshot(), &snap);
    }

    #[test]
    fn failed_poll_invalidates_snapshot() {
        let mut src = TelemetrySource::new();
        let mut bus = bus();
        src.refresh_measurements(&mut bus).unwrap();

        bus.fail = Some(TelemetryError::Timeout);
        assert_eq!(
            src.refresh_measurements(&mut bus),
            Err(TelemetryError::Timeout)
        );
        assert_eq!(src.snapshot(), &TelemetrySnapshot::INVALID);
    }

    #[test]
    fn status_poll_is_independent() {
        let mut src = TelemetrySource::new();
        let mut bus = bus();
        let status = *src.refresh_status(&mut bus).unwrap();
        assert!(status.valid);
        assert_eq!(status.battery, super::super::Battery::OverVoltage);
        // Measurements untouched.
        assert!(!src.snapshot().valid);

        bus.fail = Some(TelemetryError::CrcMismatch);
        assert!(src.refresh_status(&mut bus).is_err());
        assert!(!src.status().valid);
    }
}

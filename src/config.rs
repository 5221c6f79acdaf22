//! System configuration parameters
//!
//! All tunable parameters for the station controller.
//! Values can be overridden via NVS (non-volatile storage).
//!
//! The load-shedding thresholds are *not* here: they are runtime state,
//! mutated over the wire and persisted in the byte store
//! (see [`crate::station::thresholds`]).  The defaults below only apply
//! while that store is blank.

use serde::{Deserialize, Serialize};

/// Longest register-reply wait a stored config may ask for.
pub const MAX_MODBUS_TIMEOUT_MS: u32 = 2_000;

/// Longest per-channel relay self-test step a stored config may ask for.
pub const MAX_SELF_TEST_STEP_MS: u32 = 500;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    // --- Network ---
    /// UDP port the command protocol listens on
    pub udp_port: u16,

    // --- Charge controller bus ---
    /// Modbus slave address of the charge controller
    pub modbus_unit_id: u8,
    /// RS-485 line speed
    pub modbus_baudrate: u32,
    /// How long to wait for a register reply (milliseconds)
    pub modbus_timeout_ms: u32,

    // --- Job intervals ---
    /// Command receive poll interval (milliseconds)
    pub receive_interval_ms: u32,
    /// Measurement register poll interval (milliseconds)
    pub measurement_interval_ms: u32,
    /// Status register poll interval (milliseconds)
    pub status_interval_ms: u32,
    /// Hysteresis evaluation interval (milliseconds)
    pub evaluate_interval_ms: u32,
    /// Relay pin projection interval (milliseconds)
    pub apply_interval_ms: u32,

    // --- Thresholds fallback ---
    /// Battery voltage at which loads may be energised, used on a blank store
    pub default_voltage_on: f32,
    /// Battery voltage at which loads are shed, used on a blank store
    pub default_voltage_off: f32,

    // --- Start-up ---
    /// Per-channel delay of the relay self-test sweep (milliseconds)
    pub self_test_step_ms: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            // Network
            udp_port: 8888,

            // Charge controller bus
            modbus_unit_id: 1,
            modbus_baudrate: 115_200,
            modbus_timeout_ms: 200,

            // Job intervals
            receive_interval_ms: 250,
            measurement_interval_ms: 1000,
            status_interval_ms: 1000,
            evaluate_interval_ms: 1000,
            apply_interval_ms: 1000,

            // Thresholds fallback (24 V bank)
            default_voltage_on: 26.0,
            default_voltage_off: 24.0,

            // Start-up
            self_test_step_ms: 75,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = StationConfig::default();
        assert!(c.default_voltage_on > c.default_voltage_off);
        assert!(c.udp_port > 0);
        assert!(c.modbus_unit_id > 0 && c.modbus_unit_id <= 247);
        assert!(c.receive_interval_ms > 0);
        assert!(c.evaluate_interval_ms > 0);
    }

    #[test]
    fn receive_faster_than_control_jobs() {
        let c = StationConfig::default();
        assert!(
            c.receive_interval_ms < c.evaluate_interval_ms,
            "commands should be polled more often than the load is evaluated"
        );
        assert!(c.modbus_timeout_ms < c.measurement_interval_ms);
    }

    #[test]
    fn serde_roundtrip() {
        let c = StationConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: StationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = StationConfig {
            udp_port: 9000,
            default_voltage_on: 13.2,
            ..Default::default()
        };
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: StationConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c2.udp_port, 9000);
        assert!((c2.default_voltage_on - 13.2).abs() < f32::EPSILON);
    }
}

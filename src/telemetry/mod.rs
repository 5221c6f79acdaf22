//! Charge-controller telemetry.
//!
//! The station reads two register blocks from an EPEver-style MPPT
//! controller: a measurement block (voltages and currents) and a status
//! block (bitfields).  Each is cached in a snapshot that carries its own
//! validity flag; a failed poll replaces the cache with an explicit
//! invalid value instead of leaving stale data around.

pub mod epever;
pub mod source;

pub use epever::{Arrays, Battery, Charging, Load, Temperature};
pub use source::TelemetrySource;

/// Last decoded measurement block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    pub panel_voltage: f32,
    pub panel_current: f32,
    pub battery_voltage: f32,
    pub battery_charge_current: f32,
    pub valid: bool,
}

impl TelemetrySnapshot {
    /// Zeroed snapshot marked invalid.
    pub const INVALID: Self = Self {
        panel_voltage: 0.0,
        panel_current: 0.0,
        battery_voltage: 0.0,
        battery_charge_current: 0.0,
        valid: false,
    };

    pub const fn new(
        panel_voltage: f32,
        panel_current: f32,
        battery_voltage: f32,
        battery_charge_current: f32,
    ) -> Self {
        Self {
            panel_voltage,
            panel_current,
            battery_voltage,
            battery_charge_current,
            valid: true,
        }
    }
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Last decoded status block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus {
    pub wrong_voltage_id: bool,
    pub temperature: Temperature,
    pub battery: Battery,
    pub charging: Charging,
    pub arrays: Arrays,
    pub load: Load,
    pub valid: bool,
}

impl DeviceStatus {
    pub const INVALID: Self = Self {
        wrong_voltage_id: false,
        temperature: Temperature::Normal,
        battery: Battery::Normal,
        charging: Charging::NoCharging,
        arrays: Arrays::Normal,
        load: Load::Light,
        valid: false,
    };
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self::INVALID
    }
}

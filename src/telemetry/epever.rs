//! EPEver charge-controller register map and decoding.
//!
//! Measurement block (input registers, ×100 fixed point):
//!
//! | Register | Offset | Content                |
//! |----------|--------|------------------------|
//! | 0x3100   | 0      | PV array voltage       |
//! | 0x3101   | 1      | PV array current       |
//! | 0x3104   | 4      | Battery voltage        |
//! | 0x3105   | 5      | Battery charge current |
//!
//! Status block (input registers 0x3200..0x3202):
//!
//! ```text
//!  reg0  D15 wrong voltage id │ D7-D4 temperature │ D3-D0 battery
//!  reg1  D15-D14 arrays       │ D3-D2 charging
//!  reg2  D13-D12 load
//! ```

use super::{DeviceStatus, TelemetrySnapshot};

pub const MEASUREMENT_BASE: u16 = 0x3100;
pub const MEASUREMENT_COUNT: usize = 6;
pub const STATUS_BASE: u16 = 0x3200;
pub const STATUS_COUNT: usize = 3;

const SCALE: f32 = 100.0;

// ---------------------------------------------------------------------------
// Status field enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temperature {
    Normal,
    OverTemp,
    LowTemp,
    Unknown(u16),
}

impl From<u16> for Temperature {
    fn from(raw: u16) -> Self {
        match raw {
            0 => Self::Normal,
            1 => Self::OverTemp,
            2 => Self::LowTemp,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Battery {
    Normal,
    OverVoltage,
    UnderVoltage,
    OverDischarge,
    Fault,
    Unknown(u16),
}

impl From<u16> for Battery {
    fn from(raw: u16) -> Self {
        match raw {
            0 => Self::Normal,
            1 => Self::OverVoltage,
            2 => Self::UnderVoltage,
            3 => Self::OverDischarge,
            4 => Self::Fault,
            other => Self::Unknown(other),
        }
    }
}

/// Two-bit field, so every raw value is documented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charging {
    NoCharging,
    Float,
    Boost,
    Equalization,
}

impl From<u16> for Charging {
    fn from(raw: u16) -> Self {
        match raw & 0b11 {
            0 => Self::NoCharging,
            1 => Self::Float,
            2 => Self::Boost,
            _ => Self::Equalization,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrays {
    Normal,
    NoInputPower,
    HigherVoltage,
    VoltageError,
}

impl From<u16> for Arrays {
    fn from(raw: u16) -> Self {
        match raw & 0b11 {
            0 => Self::Normal,
            1 => Self::NoInputPower,
            2 => Self::HigherVoltage,
            _ => Self::VoltageError,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Load {
    Light,
    Moderate,
    Rated,
    Overload,
}

impl From<u16> for Load {
    fn from(raw: u16) -> Self {
        match raw & 0b11 {
            0 => Self::Light,
            1 => Self::Moderate,
            2 => Self::Rated,
            _ => Self::Overload,
        }
    }
}

// ---------------------------------------------------------------------------
// Block decoders
// ---------------------------------------------------------------------------

pub fn decode_measurements(regs: &[u16; MEASUREMENT_COUNT]) -> TelemetrySnapshot {
    TelemetrySnapshot::new(
        f32::from(regs[0]) / SCALE,
        f32::from(regs[1]) / SCALE,
        f32::from(regs[4]) / SCALE,
        f32::from(regs[5]) / SCALE,
    )
}

pub fn decode_status(regs: &[u16; STATUS_COUNT]) -> DeviceStatus {
    DeviceStatus {
        wrong_voltage_id: regs[0] & 0x8000 != 0,
        temperature: Temperature::from((regs[0] & 0x00F0) >> 4),
        battery: Battery::from(regs[0] & 0x000F),
        charging: Charging::from((regs[1] & 0x000C) >> 2),
        arrays: Arrays::from((regs[1] & 0xC000) >> 14),
        load: Load::from((regs[2] & 0x3000) >> 12),
        valid: true,
    }
}

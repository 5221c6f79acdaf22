//! Persisted load-shedding thresholds.
//!
//! Two floats, mutated only through ConfigSet and written through to the
//! byte store on every change.

use log::{info, warn};

use crate::app::ports::ByteStore;
use crate::config::StationConfig;
use crate::protocol::ConfigParam;

use super::layout::{VOLTAGE_OFF_OFFSET, VOLTAGE_ON_OFFSET};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Battery voltage at or above which loads may be energised.
    pub voltage_on: f32,
    /// Battery voltage at or below which loads are shed.
    pub voltage_off: f32,
}

impl Thresholds {
    /// Read both thresholds from the store.
    ///
    /// A slot that cannot be read or holds a non-finite value (blank
    /// store) falls back to the matching default from `config`.  The
    /// fallback is not written back.
    pub fn load(store: &impl ByteStore, config: &StationConfig) -> Self {
        let loaded = Self {
            voltage_on: read_slot(store, ConfigParam::VoltageOn, config.default_voltage_on),
            voltage_off: read_slot(store, ConfigParam::VoltageOff, config.default_voltage_off),
        };
        if loaded.voltage_on < loaded.voltage_off {
            warn!(
                "Thresholds: on {:.2} V below off {:.2} V, load will chatter",
                loaded.voltage_on, loaded.voltage_off
            );
        }
        info!(
            "Thresholds: on={:.2} V off={:.2} V",
            loaded.voltage_on, loaded.voltage_off
        );
        loaded
    }

    pub fn get(&self, param: ConfigParam) -> f32 {
        match param {
            ConfigParam::VoltageOff => self.voltage_off,
            ConfigParam::VoltageOn => self.voltage_on,
        }
    }

    /// Update one threshold in memory and persist it.
    ///
    /// A store failure is logged; the in-memory value changes regardless.
    pub fn set(&mut self, param: ConfigParam, value: f32, store: &mut impl ByteStore) {
        match param {
            ConfigParam::VoltageOff => self.voltage_off = value,
            ConfigParam::VoltageOn => self.voltage_on = value,
        }
        if let Err(e) = store.write(offset_of(param), &value.to_le_bytes()) {
            warn!("Thresholds: persisting {} failed: {}", param.name(), e);
        }
        if self.voltage_on < self.voltage_off {
            warn!(
                "Thresholds: on {:.2} V below off {:.2} V, load will chatter",
                self.voltage_on, self.voltage_off
            );
        }
    }
}

const fn offset_of(param: ConfigParam) -> usize {
    match param {
        ConfigParam::VoltageOff => VOLTAGE_OFF_OFFSET,
        ConfigParam::VoltageOn => VOLTAGE_ON_OFFSET,
    }
}

fn read_slot(store: &impl ByteStore, param: ConfigParam, default: f32) -> f32 {
    let mut raw = [0u8; 4];
    if let Err(e) = store.read(offset_of(param), &mut raw) {
        warn!("Thresholds: reading {} failed ({}), using {:.2}", param.name(), e, default);
        return default;
    }
    let value = f32::from_le_bytes(raw);
    if value.is_finite() {
        value
    } else {
        warn!("Thresholds: {} not set, using {:.2}", param.name(), default);
        default
    }
}

//! Eight-channel relay board driver.
//!
//! The board's opto-isolated inputs are active-low: pulling a pin LOW
//! energises its relay.  Every channel is released at construction so a
//! reboot never glitches a load on.
//!
//! ## Dual-target design
//!
//! Generic over `embedded_hal::digital::OutputPin`, so the same driver runs
//! on `esp_idf_hal::gpio::PinDriver`s and on mock pins in host tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, info};

use crate::app::ports::RelayOutputs;
use crate::station::RELAY_COUNT;

pub struct RelayDriver<P> {
    pins: [P; RELAY_COUNT],
    energized: [bool; RELAY_COUNT],
}

impl<P: OutputPin> RelayDriver<P> {
    /// Take ownership of the channel pins (index order) and release all.
    pub fn new(pins: [P; RELAY_COUNT]) -> Self {
        let mut driver = Self {
            pins,
            energized: [true; RELAY_COUNT],
        };
        for index in 0..RELAY_COUNT {
            driver.drive(index, false);
        }
        driver
    }

    /// Last level written to channel `index`.
    pub fn is_energized(&self, index: usize) -> Option<bool> {
        self.energized.get(index).copied()
    }

    /// Driven state packed as bit i = channel i.
    pub fn bits(&self) -> u8 {
        self.energized
            .iter()
            .enumerate()
            .fold(0, |acc, (i, on)| acc | (u8::from(*on) << i))
    }

    /// Start-up sweep: energise each channel in turn, then release each
    /// in turn, pausing `step_ms` after every switch.
    pub fn self_test(&mut self, delay: &mut impl DelayNs, step_ms: u32) {
        info!("Relays: self-test ({} ms step)", step_ms);
        for on in [true, false] {
            for index in 0..RELAY_COUNT {
                self.drive(index, on);
                delay.delay_ms(step_ms);
            }
        }
    }

    fn drive(&mut self, index: usize, on: bool) {
        let Some(pin) = self.pins.get_mut(index) else {
            return;
        };
        let result = if on { pin.set_low() } else { pin.set_high() };
        match result {
            Ok(()) => self.energized[index] = on,
            Err(_) => debug!("Relays: channel {} pin write failed", index),
        }
    }
}

impl<P: OutputPin> RelayOutputs for RelayDriver<P> {
    fn set_energized(&mut self, index: usize, energized: bool) {
        self.drive(index, energized);
    }
}

//! Task watchdog for the main loop.
//!
//! The station resets through the ESP-IDF TWDT when a pass of the main
//! loop stalls, typically a wedged RS-485 transaction or a UART driver
//! that never returns.  The main loop feeds it after every `run_cycle`
//! and after each slow boot stage.
//!
//! The timeout has to outlast the slowest legitimate pass.  That is a
//! pass where both register blocks are polled and every read waits out
//! the longest bus timeout a stored config may set: a header read and a
//! body read per block.  The boot-time relay sweep is bounded the same
//! way by the longest accepted self-test step.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::config::{MAX_MODBUS_TIMEOUT_MS, MAX_SELF_TEST_STEP_MS};
use crate::station::RELAY_COUNT;

/// Register blocks polled per pass (measurements, status).
const BLOCKS_PER_PASS: u32 = 2;
/// Bounded UART reads per block (header, body).
const READS_PER_BLOCK: u32 = 2;

/// Slowest main-loop pass with a silent charge controller.
pub const WORST_POLL_MS: u32 = BLOCKS_PER_PASS * READS_PER_BLOCK * MAX_MODBUS_TIMEOUT_MS;

/// Slowest relay self-test: every channel on, then every channel off.
pub const WORST_SELF_TEST_MS: u32 = 2 * RELAY_COUNT as u32 * MAX_SELF_TEST_STEP_MS;

/// Stall budget before the TWDT panics and resets the station.
pub const TIMEOUT_MS: u32 = 10_000;

const _: () = assert!(TIMEOUT_MS > WORST_POLL_MS && TIMEOUT_MS > WORST_SELF_TEST_MS);

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    #[cfg(not(target_os = "espidf"))]
    feeds: core::cell::Cell<u32>,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    /// Arm the TWDT and subscribe the calling (main) task.
    pub fn new() -> Self {
        #[cfg(target_os = "espidf")]
        {
            let cfg = esp_task_wdt_config_t {
                timeout_ms: TIMEOUT_MS,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            // SAFETY: plain FFI calls; a null task handle means "current task".
            let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
            if ret != ESP_OK {
                warn!("Watchdog: reconfigure returned {}, keeping boot settings", ret);
            }
            let ret = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
            let subscribed = ret == ESP_OK;
            if subscribed {
                info!(
                    "Watchdog: main task armed ({} ms, worst poll pass {} ms)",
                    TIMEOUT_MS, WORST_POLL_MS
                );
            } else {
                warn!("Watchdog: main task not subscribed ({}), running unguarded", ret);
            }
            Self { subscribed }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("Watchdog(sim): counting feeds");
            Self {
                feeds: core::cell::Cell::new(0),
            }
        }
    }

    /// Feed the watchdog.  Must be called at least every [`TIMEOUT_MS`].
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.feeds.set(self.feeds.get().wrapping_add(1));
        }
    }

    /// Number of feeds so far (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn feeds(&self) -> u32 {
        self.feeds.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StationConfig;

    #[test]
    fn feeds_are_counted_in_simulation() {
        let wdt = Watchdog::new();
        wdt.feed();
        wdt.feed();
        assert_eq!(wdt.feeds(), 2);
    }

    #[test]
    fn default_config_leaves_ample_margin() {
        let cfg = StationConfig::default();
        let poll = BLOCKS_PER_PASS * READS_PER_BLOCK * cfg.modbus_timeout_ms;
        let sweep = 2 * RELAY_COUNT as u32 * cfg.self_test_step_ms;
        assert!(poll * 4 < TIMEOUT_MS);
        assert!(sweep * 4 < TIMEOUT_MS);
    }
}

//! ESP32 clock adapter.
//!
//! Implements [`ClockPort`]: a monotonic millisecond counter for the
//! scheduler plus the settable wall-clock epoch reported in telemetry.
//!
//! - **`target_os = "espidf"`**: uptime from `esp_timer_get_time()`,
//!   epoch through `gettimeofday` / `settimeofday` on the system RTC.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` plus an epoch
//!   offset, for host-side testing and simulation.

use crate::app::ports::ClockPort;

pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
    /// Epoch value at `start`.
    #[cfg(not(target_os = "espidf"))]
    epoch_base: u32,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
            #[cfg(not(target_os = "espidf"))]
            epoch_base: 0,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn elapsed_secs(&self) -> u32 {
        self.start.elapsed().as_secs() as u32
    }
}

#[cfg(target_os = "espidf")]
impl ClockPort for SystemClock {
    fn now_epoch(&self) -> u32 {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: `tv` is a valid out-pointer; the timezone argument may be null.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return 0;
        }
        tv.tv_sec as u32
    }

    fn set_epoch(&mut self, epoch: u32) {
        let tv = esp_idf_svc::sys::timeval {
            tv_sec: epoch as esp_idf_svc::sys::time_t,
            tv_usec: 0,
        };
        // SAFETY: `tv` outlives the call; the timezone argument may be null.
        if unsafe { esp_idf_svc::sys::settimeofday(&tv, core::ptr::null()) } != 0 {
            log::warn!("Clock: settimeofday({}) failed", epoch);
        }
    }

    fn uptime_ms(&self) -> u32 {
        // Truncation is the 32-bit wrap the scheduler expects.
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1000) as u32
    }
}

#[cfg(not(target_os = "espidf"))]
impl ClockPort for SystemClock {
    fn now_epoch(&self) -> u32 {
        self.epoch_base.wrapping_add(self.elapsed_secs())
    }

    fn set_epoch(&mut self, epoch: u32) {
        self.epoch_base = epoch.wrapping_sub(self.elapsed_secs());
    }

    fn uptime_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

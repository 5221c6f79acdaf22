//! Device restart adapter.
//!
//! Implements [`RestartPort`].  On ESP32 this is `esp_restart()`, which
//! never returns.  On host targets the request is only counted so tests
//! and simulations can observe it.

use log::warn;

use crate::app::ports::RestartPort;

#[derive(Debug, Default)]
pub struct SystemRestart {
    #[cfg(not(target_os = "espidf"))]
    requests: u32,
}

impl SystemRestart {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many restarts have been requested (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn requests(&self) -> u32 {
        self.requests
    }
}

impl RestartPort for SystemRestart {
    fn restart(&mut self) {
        warn!("System: restarting");

        #[cfg(target_os = "espidf")]
        // SAFETY: esp_restart has no preconditions.
        unsafe {
            esp_idf_svc::sys::esp_restart();
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.requests += 1;
        }
    }
}

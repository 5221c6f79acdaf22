//! Application context shared by the dispatcher and the load controller.

use crate::app::ports::ByteStore;
use crate::config::StationConfig;
use crate::telemetry::TelemetrySource;

use super::relays::RelayBank;
use super::thresholds::Thresholds;

/// Everything the station mutates at runtime.
///
/// Constructed once at start-up and passed by reference; the main loop
/// is single-threaded, so no job ever sees it mid-update.
#[derive(Debug, Clone)]
pub struct StationContext {
    pub thresholds: Thresholds,
    pub relays: RelayBank,
    pub telemetry: TelemetrySource,
    /// Global load enable, written only by the hysteresis step.
    pub load_enabled: bool,
    /// Set by the Reset command, honoured after the reply is sent.
    pub restart_requested: bool,
}

impl StationContext {
    /// Load persisted state from `store`; telemetry starts invalid and
    /// the load starts disabled.
    pub fn load(store: &impl ByteStore, config: &StationConfig) -> Self {
        Self {
            thresholds: Thresholds::load(store, config),
            relays: RelayBank::load(store),
            telemetry: TelemetrySource::new(),
            load_enabled: false,
            restart_requested: false,
        }
    }
}

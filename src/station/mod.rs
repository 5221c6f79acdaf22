//! Persistent station state: thresholds, relay bank, and the context
//! that bundles them with the telemetry cache.

pub mod context;
pub mod layout;
pub mod relays;
pub mod thresholds;

pub use context::StationContext;
pub use relays::{RELAY_COUNT, RelayBank};
pub use thresholds::Thresholds;

//! Battery-voltage hysteresis load controller.
//!
//! The load turns on once the battery rises to `voltage_on` and stays on
//! until it falls to `voltage_off`.  Between the two thresholds the
//! previous decision is kept.
//!
//! ```text
//!  enable ▲
//!       1 │        ┌────────◀──────────┐
//!         │        │                   │
//!       0 │────────┴────────▶──────────┘
//!         └────────┬───────────────────┬────▶ battery V
//!                 off                  on
//! ```

use crate::app::ports::RelayOutputs;
use crate::station::{RelayBank, StationContext, Thresholds};

/// One hysteresis step.
///
/// A NaN voltage compares false both ways and keeps `previous`.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn next_enable(battery_voltage: f32, thresholds: &Thresholds, previous: bool) -> bool {
    battery_voltage >= thresholds.voltage_on
        || (previous && !(battery_voltage <= thresholds.voltage_off))
}

/// Outcome of [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Snapshot invalid; the enable flag was left alone.
    Skipped,
    Unchanged(bool),
    Changed { from: bool, to: bool },
}

/// Run the hysteresis step against the cached snapshot and update the
/// global enable flag.  Skipped entirely while the snapshot is invalid.
pub fn evaluate(ctx: &mut StationContext) -> Evaluation {
    let snapshot = ctx.telemetry.snapshot();
    if !snapshot.valid {
        return Evaluation::Skipped;
    }
    let from = ctx.load_enabled;
    let to = next_enable(snapshot.battery_voltage, &ctx.thresholds, from);
    ctx.load_enabled = to;
    if from == to {
        Evaluation::Unchanged(to)
    } else {
        Evaluation::Changed { from, to }
    }
}

/// Drive every relay: energised iff the load is enabled and its bank
/// slot is on.  Re-applied every tick, so a glitched pin is corrected on
/// the next pass.
///
/// Returns the packed bit pattern that was driven.
pub fn apply(load_enabled: bool, relays: &RelayBank, outputs: &mut impl RelayOutputs) -> u8 {
    let mut driven = 0u8;
    for (index, on) in relays.iter() {
        let energize = load_enabled && on;
        outputs.set_energized(index, energize);
        if energize {
            driven |= 1 << index;
        }
    }
    driven
}

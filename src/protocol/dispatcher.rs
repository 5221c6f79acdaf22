//! Command dispatcher.
//!
//! One call per decoded request; stateless between calls except for the
//! [`StationContext`] it mutates.  Every request produces exactly one
//! response: the echoed command with its result arguments, or a Nack
//! carrying the offending tag.
//!
//! | Command    | Request args        | Response args                          |
//! |------------|---------------------|----------------------------------------|
//! | Ping       | none                | epoch u32                              |
//! | Reset      | none                | none                                   |
//! | Telemetry  | none                | epoch u32, 4 × f32, enable u8 (21 B)   |
//! | RTCRead    | none                | epoch u32                              |
//! | RTCSet     | epoch u32           | epoch u32 (read back)                  |
//! | ConfigRead | id u8               | id u8, value f32 (if id known)         |
//! | ConfigSet  | id u8, value f32    | id u8, value f32 (if id known)         |
//! | OutputRead | index u8            | index u8, state u8                     |
//! | OutputSet  | index u8, state u8  | index u8, state u8                     |
//!
//! Rejected with Nack: unknown tag, missing or truncated arguments,
//! relay index ≥ [`RELAY_COUNT`], non-finite ConfigSet value.

use log::{debug, info};

use crate::app::ports::{ByteStore, ClockPort};
use crate::error::ProtocolError;
use crate::station::{RELAY_COUNT, StationContext};

use super::codec::{Request, Response};
use super::command::{Command, ConfigParam};

// Telemetry reply offsets.
const TELEMETRY_EPOCH: usize = 0;
const TELEMETRY_PANEL_VOLTAGE: usize = 4;
const TELEMETRY_PANEL_CURRENT: usize = 8;
const TELEMETRY_BATTERY_VOLTAGE: usize = 12;
const TELEMETRY_BATTERY_CURRENT: usize = 16;
const TELEMETRY_ENABLE: usize = 20;

// ConfigRead / ConfigSet offsets.
const CONFIG_ID: usize = 0;
const CONFIG_VALUE: usize = 1;

// OutputRead / OutputSet offsets.
const OUTPUT_INDEX: usize = 0;
const OUTPUT_STATE: usize = 1;

/// Execute `request` and build its response.
pub fn dispatch(
    request: &Request,
    ctx: &mut StationContext,
    clock: &mut impl ClockPort,
    store: &mut impl ByteStore,
) -> Response {
    match execute(request, ctx, clock, store) {
        Ok(response) => response,
        Err(e) => {
            debug!("dispatch: {} rejected: {}", request.command, e);
            Response::nack(request.peer, request.command.tag())
        }
    }
}

fn execute(
    request: &Request,
    ctx: &mut StationContext,
    clock: &mut impl ClockPort,
    store: &mut impl ByteStore,
) -> Result<Response, ProtocolError> {
    let mut response = Response::echo(request.peer, request.command);
    let args = &request.args;
    let out = &mut response.args;

    match request.command {
        Command::Ping | Command::RtcRead => {
            out.put(0, clock.now_epoch())?;
        }

        Command::Reset => {
            info!("dispatch: restart requested by {}", request.peer);
            ctx.restart_requested = true;
        }

        Command::Telemetry => {
            let snap = ctx.telemetry.snapshot();
            out.put(TELEMETRY_EPOCH, clock.now_epoch())?;
            out.put(TELEMETRY_PANEL_VOLTAGE, snap.panel_voltage)?;
            out.put(TELEMETRY_PANEL_CURRENT, snap.panel_current)?;
            out.put(TELEMETRY_BATTERY_VOLTAGE, snap.battery_voltage)?;
            out.put(TELEMETRY_BATTERY_CURRENT, snap.battery_charge_current)?;
            out.put(TELEMETRY_ENABLE, u8::from(ctx.load_enabled))?;
        }

        Command::RtcSet => {
            let epoch: u32 = args.get(0).map_err(|_| ProtocolError::MissingArgument)?;
            clock.set_epoch(epoch);
            info!("dispatch: clock set to {}", epoch);
            out.put(0, clock.now_epoch())?;
        }

        Command::ConfigRead => {
            let id: u8 = args.get(CONFIG_ID).map_err(|_| ProtocolError::MissingArgument)?;
            out.put(CONFIG_ID, id)?;
            if let Some(param) = ConfigParam::from_id(id) {
                out.put(CONFIG_VALUE, ctx.thresholds.get(param))?;
            }
        }

        Command::ConfigSet => {
            let id: u8 = args.get(CONFIG_ID).map_err(|_| ProtocolError::MissingArgument)?;
            out.put(CONFIG_ID, id)?;
            if let Some(param) = ConfigParam::from_id(id) {
                let value: f32 = args
                    .get(CONFIG_VALUE)
                    .map_err(|_| ProtocolError::MissingArgument)?;
                if !value.is_finite() {
                    return Err(ProtocolError::InvalidArgument);
                }
                ctx.thresholds.set(param, value, store);
                info!("dispatch: {} set to {:.2}", param.name(), value);
                out.put(CONFIG_VALUE, ctx.thresholds.get(param))?;
            }
        }

        Command::OutputRead => {
            let index = relay_index(request)?;
            let on = ctx.relays.get(index).ok_or(ProtocolError::InvalidArgument)?;
            out.put(OUTPUT_INDEX, index as u8)?;
            out.put(OUTPUT_STATE, u8::from(on))?;
        }

        Command::OutputSet => {
            let index = relay_index(request)?;
            let wanted: u8 = args
                .get(OUTPUT_STATE)
                .map_err(|_| ProtocolError::MissingArgument)?;
            let on = ctx
                .relays
                .set(index, wanted != 0, store)
                .ok_or(ProtocolError::InvalidArgument)?;
            info!("dispatch: relay {} {}", index, if on { "on" } else { "off" });
            out.put(OUTPUT_INDEX, index as u8)?;
            out.put(OUTPUT_STATE, u8::from(on))?;
        }

        Command::Unknown(_) => return Err(ProtocolError::InvalidArgument),
    }

    Ok(response)
}

fn relay_index(request: &Request) -> Result<usize, ProtocolError> {
    let index: u8 = request
        .args
        .get(OUTPUT_INDEX)
        .map_err(|_| ProtocolError::MissingArgument)?;
    let index = usize::from(index);
    if index < RELAY_COUNT {
        Ok(index)
    } else {
        Err(ProtocolError::InvalidArgument)
    }
}

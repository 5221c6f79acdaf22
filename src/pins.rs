//! GPIO / peripheral pin assignments for the station controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Relay board (8 channels, opto-isolated, active LOW)
// ---------------------------------------------------------------------------

/// Relay channel pins in channel order (index 0 = channel 1 on the board).
pub const RELAY_GPIOS: [i32; crate::station::RELAY_COUNT] = [4, 5, 13, 14, 18, 19, 21, 22];

// ---------------------------------------------------------------------------
// Charge controller bus (MAX485 half-duplex RS-485 on UART2)
// ---------------------------------------------------------------------------

/// UART TX → transceiver DI.
pub const RS485_TX_GPIO: i32 = 17;
/// UART RX ← transceiver RO.
pub const RS485_RX_GPIO: i32 = 16;
/// Driver enable: HIGH while transmitting.
pub const RS485_DE_GPIO: i32 = 25;
/// Receiver enable (active LOW): HIGH while transmitting.
pub const RS485_RE_GPIO: i32 = 26;

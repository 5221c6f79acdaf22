//! Byte-store layout.
//!
//! | Offset | Size | Content                                   |
//! |--------|------|-------------------------------------------|
//! | 0      | 4    | voltage-off threshold, f32 little-endian  |
//! | 4      | 4    | voltage-on threshold, f32 little-endian   |
//! | 8      | 1    | relay bank, bit `i` = relay `i`            |
//!
//! Single source of truth for every persisted offset.  Never reorder:
//! existing stations would reinterpret their stored bytes.

pub const VOLTAGE_OFF_OFFSET: usize = 0;
pub const VOLTAGE_ON_OFFSET: usize = 4;
pub const RELAY_BANK_OFFSET: usize = 8;

/// Total size of the byte store.
pub const STORE_SIZE: usize = 64;

/// Value of a byte that was never written.
pub const BLANK: u8 = 0xFF;

//! Persisted relay bank.
//!
//! Eight on/off states packed into one byte of the store (bit `i` is
//! relay `i`).  The bank records what each channel *should* do when the
//! load is enabled; the physical pins are driven by
//! [`crate::control::load::apply`].

use log::{info, warn};

use crate::app::ports::ByteStore;

use super::layout::RELAY_BANK_OFFSET;

/// Number of relay channels.  Fixed by the board.
pub const RELAY_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelayBank {
    bits: u8,
}

impl RelayBank {
    /// Bank with the given packed states.
    pub const fn from_bits(bits: u8) -> Self {
        Self { bits }
    }

    /// Load the bank from the store.
    ///
    /// A blank store reads `0xFF`, i.e. every relay enabled.  If the byte
    /// cannot be read at all, every relay starts disabled.
    pub fn load(store: &impl ByteStore) -> Self {
        let mut raw = [0u8; 1];
        match store.read(RELAY_BANK_OFFSET, &mut raw) {
            Ok(()) => {
                info!("RelayBank: loaded 0b{:08b}", raw[0]);
                Self::from_bits(raw[0])
            }
            Err(e) => {
                warn!("RelayBank: load failed ({}), all relays off", e);
                Self::default()
            }
        }
    }

    pub const fn bits(&self) -> u8 {
        self.bits
    }

    /// State of relay `index`, `None` if out of range.
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < RELAY_COUNT).then(|| self.bits & (1 << index) != 0)
    }

    /// Set relay `index` and persist the containing byte.
    ///
    /// Returns the resulting state, or `None` (nothing changed) if
    /// `index` is out of range.  A store failure is logged; the
    /// in-memory state changes regardless.
    pub fn set(&mut self, index: usize, on: bool, store: &mut impl ByteStore) -> Option<bool> {
        if index >= RELAY_COUNT {
            return None;
        }
        let mask = 1u8 << index;

        // Read-modify-write of the stored byte.
        let mut stored = [self.bits];
        if let Err(e) = store.read(RELAY_BANK_OFFSET, &mut stored) {
            warn!("RelayBank: read before write failed ({}), using cached byte", e);
            stored[0] = self.bits;
        }
        let updated = if on { stored[0] | mask } else { stored[0] & !mask };
        if let Err(e) = store.write(RELAY_BANK_OFFSET, &[updated]) {
            warn!("RelayBank: persisting relay {} failed: {}", index, e);
        }

        if on {
            self.bits |= mask;
        } else {
            self.bits &= !mask;
        }
        self.get(index)
    }

    /// Iterate `(index, state)` over all channels.
    pub fn iter(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        (0..RELAY_COUNT).map(move |i| (i, self.bits & (1 << i) != 0))
    }
}

//! Fixed-capacity argument buffer shared by requests and responses.
//!
//! Fields live at absolute, protocol-defined offsets (the ConfigSet value
//! always starts at offset 1, the Telemetry enable byte always sits at
//! offset 20).  Every access is bounds-checked, and the buffer tracks a
//! high-water mark (the largest `offset + len` ever written), which is
//! the argument length put on the wire.

use crate::error::ProtocolError;

use super::wire::WireValue;

/// Argument bytes following the tag byte (32-byte datagrams).
pub const ARG_CAPACITY: usize = 31;

#[derive(Clone, PartialEq, Eq)]
pub struct Args {
    buf: [u8; ARG_CAPACITY],
    len: usize,
}

impl Args {
    pub const fn new() -> Self {
        Self {
            buf: [0; ARG_CAPACITY],
            len: 0,
        }
    }

    /// Copy received argument bytes, truncating at [`ARG_CAPACITY`].
    pub fn from_received(bytes: &[u8]) -> Self {
        let mut args = Self::new();
        let len = bytes.len().min(ARG_CAPACITY);
        args.buf[..len].copy_from_slice(&bytes[..len]);
        args.len = len;
        args
    }

    /// High-water mark: number of meaningful bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Borrow `len` bytes at `offset`.  Fails if any of them were never
    /// received or written.
    pub fn read_at(&self, offset: usize, len: usize) -> Result<&[u8], ProtocolError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.len => Ok(&self.buf[offset..end]),
            _ => Err(ProtocolError::OutOfBounds { offset, len }),
        }
    }

    /// Copy `data` to `offset`, raising the high-water mark if needed.
    pub fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<(), ProtocolError> {
        let end = offset
            .checked_add(data.len())
            .filter(|end| *end <= ARG_CAPACITY)
            .ok_or(ProtocolError::OutOfBounds {
                offset,
                len: data.len(),
            })?;
        self.buf[offset..end].copy_from_slice(data);
        self.len = self.len.max(end);
        Ok(())
    }

    /// Read a big-endian field.
    pub fn get<T: WireValue>(&self, offset: usize) -> Result<T, ProtocolError> {
        self.read_at(offset, T::SIZE).map(T::from_wire)
    }

    /// Write a big-endian field.
    pub fn put<T: WireValue>(&mut self, offset: usize, value: T) -> Result<(), ProtocolError> {
        let mut raw = [0u8; 8];
        value.to_wire(&mut raw[..T::SIZE]);
        self.write_at(offset, &raw[..T::SIZE])
    }
}

impl Default for Args {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Args {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.as_bytes()).finish()
    }
}

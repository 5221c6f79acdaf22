//! Network byte order for multi-byte protocol fields.
//!
//! The only place the codec converts between host values and wire bytes.
//! Everything is big-endian regardless of the host; `to_be_bytes` /
//! `from_be_bytes` compile to a swap on little-endian targets and to a
//! plain copy on big-endian ones.  Floats travel as their IEEE-754 bits.

/// A numeric field with a fixed big-endian wire representation.
pub trait WireValue: Sized + Copy {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Write `self` into `out[..Self::SIZE]`.
    fn to_wire(self, out: &mut [u8]);

    /// Read a value from `bytes[..Self::SIZE]`.
    fn from_wire(bytes: &[u8]) -> Self;
}

impl WireValue for u8 {
    const SIZE: usize = 1;

    fn to_wire(self, out: &mut [u8]) {
        out[0] = self;
    }

    fn from_wire(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

impl WireValue for u32 {
    const SIZE: usize = 4;

    fn to_wire(self, out: &mut [u8]) {
        out[..4].copy_from_slice(&self.to_be_bytes());
    }

    fn from_wire(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes[..4]);
        u32::from_be_bytes(raw)
    }
}

impl WireValue for f32 {
    const SIZE: usize = 4;

    fn to_wire(self, out: &mut [u8]) {
        self.to_bits().to_wire(out);
    }

    fn from_wire(bytes: &[u8]) -> Self {
        f32::from_bits(u32::from_wire(bytes))
    }
}

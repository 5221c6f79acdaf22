//! Hex rendering of datagram payloads for the serial log.

use core::fmt::Write as _;

use heapless::String;

use super::codec::DATAGRAM_SIZE;

/// Enough room for one full datagram rendered as `"xx "` triples.
pub type HexDump = String<{ DATAGRAM_SIZE * 3 }>;

/// Render bytes as lowercase, space-separated hex (`"70 0a ff"`).
///
/// Input longer than one datagram is cut at [`DATAGRAM_SIZE`] bytes.
pub fn to_hex(bytes: &[u8]) -> HexDump {
    let mut out = HexDump::new();
    for (i, byte) in bytes.iter().take(DATAGRAM_SIZE).enumerate() {
        if i > 0 {
            let _ = out.push(' ');
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_space_separated() {
        assert_eq!(to_hex(&[0x70, 0x0a, 0xff]).as_str(), "70 0a ff");
    }

    #[test]
    fn empty_is_empty() {
        assert_eq!(to_hex(&[]).as_str(), "");
    }

    #[test]
    fn full_datagram_fits() {
        let dump = to_hex(&[0xAB; DATAGRAM_SIZE]);
        assert_eq!(dump.len(), DATAGRAM_SIZE * 3 - 1);
    }

    #[test]
    fn oversized_input_is_cut() {
        let dump = to_hex(&[0x01; 100]);
        assert_eq!(dump.len(), DATAGRAM_SIZE * 3 - 1);
    }
}

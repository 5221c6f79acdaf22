//! Datagram codec.
//!
//! Wire format (request and response alike):
//! ```text
//! ┌─────────┬──────────────────────────────────────┐
//! │ Tag (1B)│ Arguments (0–31 B, big-endian fields) │
//! └─────────┴──────────────────────────────────────┘
//! ```
//!
//! A request tag is a command; a response tag is either the echoed
//! command or `N` (Nack).  Responses carry exactly as many argument bytes
//! as the dispatcher wrote, with no padding.

use std::net::SocketAddr;

use heapless::Vec;

use super::args::{ARG_CAPACITY, Args};
use super::command::{Command, Status};

/// Largest datagram either side sends.
pub const DATAGRAM_SIZE: usize = ARG_CAPACITY + 1;

/// A decoded inbound datagram.  Lives for exactly one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub peer: SocketAddr,
    pub command: Command,
    pub args: Args,
}

/// An outbound reply, addressed back to the requester.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub peer: SocketAddr,
    pub status: Status,
    pub args: Args,
}

impl Response {
    /// A reply echoing `command`, arguments still to be filled in.
    pub fn echo(peer: SocketAddr, command: Command) -> Self {
        Self {
            peer,
            status: Status::Echo(command),
            args: Args::new(),
        }
    }

    /// A rejection carrying the offending tag as its only argument.
    pub fn nack(peer: SocketAddr, rejected_tag: u8) -> Self {
        let mut args = Args::new();
        // Offset 0 always fits.
        let _ = args.put(0, rejected_tag);
        Self {
            peer,
            status: Status::Nack,
            args,
        }
    }

    /// Total wire length: tag byte plus argument high-water mark.
    pub fn wire_len(&self) -> usize {
        1 + self.args.len()
    }
}

/// Decode a received datagram.
///
/// Returns `None` for an empty datagram, which is dropped without a reply.
/// Any tag byte decodes; unknown ones become [`Command::Unknown`].
pub fn decode(peer: SocketAddr, datagram: &[u8]) -> Option<Request> {
    let (&tag, rest) = datagram.split_first()?;
    if rest.len() > ARG_CAPACITY {
        log::debug!(
            "codec: {} argument bytes from {} truncated to {}",
            rest.len(),
            peer,
            ARG_CAPACITY
        );
    }
    Some(Request {
        peer,
        command: Command::from_tag(tag),
        args: Args::from_received(rest),
    })
}

/// Encode a response into its exact wire bytes.
pub fn encode(response: &Response) -> Vec<u8, DATAGRAM_SIZE> {
    let mut out = Vec::new();
    // Capacity is tag + ARG_CAPACITY, which the argument buffer can never exceed.
    let _ = out.push(response.status.tag());
    let _ = out.extend_from_slice(response.args.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn peer() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(172, 29, 10, 1)), 40000)
    }

    #[test]
    fn empty_datagram_yields_no_request() {
        assert!(decode(peer(), &[]).is_none());
    }

    #[test]
    fn tag_only_datagram_has_no_args() {
        let req = decode(peer(), b"p").unwrap();
        assert_eq!(req.command, Command::Ping);
        assert!(req.args.is_empty());
        assert_eq!(req.peer, peer());
    }

    #[test]
    fn arguments_keep_their_offsets() {
        let req = decode(peer(), &[b'O', 3, 1]).unwrap();
        assert_eq!(req.command, Command::OutputSet);
        assert_eq!(req.args.as_bytes(), &[3, 1]);
    }

    #[test]
    fn unknown_tag_still_decodes() {
        let req = decode(peer(), &[0xFF]).unwrap();
        assert_eq!(req.command, Command::Unknown(0xFF));
    }

    #[test]
    fn oversized_datagram_is_truncated() {
        let mut datagram = [0x11_u8; 64];
        datagram[0] = b't';
        let req = decode(peer(), &datagram).unwrap();
        assert_eq!(req.args.len(), ARG_CAPACITY);
    }

    #[test]
    fn encode_emits_only_written_bytes() {
        let mut resp = Response::echo(peer(), Command::OutputRead);
        resp.args.put(0, 2_u8).unwrap();
        resp.args.put(1, 1_u8).unwrap();
        assert_eq!(encode(&resp).as_slice(), &[b'o', 2, 1]);
        assert_eq!(resp.wire_len(), 3);
    }

    #[test]
    fn encode_reset_is_a_single_byte() {
        let resp = Response::echo(peer(), Command::Reset);
        assert_eq!(encode(&resp).as_slice(), b"X");
    }

    #[test]
    fn nack_echoes_rejected_tag() {
        let resp = Response::nack(peer(), 0xFF);
        assert_eq!(encode(&resp).as_slice(), &[b'N', 0xFF]);
    }
}

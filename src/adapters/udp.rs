//! UDP command socket.
//!
//! Implements [`DatagramPort`] over a non-blocking `std::net::UdpSocket`
//! (lwIP sockets on ESP-IDF, the host stack elsewhere).  The main loop
//! polls it from the `ReceiveCommand` job, so a receive never blocks the
//! scheduler: an empty queue reads as `Ok(None)`.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};

use log::{debug, info, warn};

use crate::app::ports::DatagramPort;
use crate::error::TransportError;

pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind to `0.0.0.0:port`.
    pub fn bind(port: u16) -> Result<Self, TransportError> {
        Self::bind_addr(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port)))
    }

    /// Bind to an explicit address (port 0 picks an ephemeral port).
    pub fn bind_addr(addr: SocketAddr) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr).map_err(|e| {
            warn!("UDP: bind {} failed ({})", addr, e);
            TransportError::BindFailed
        })?;
        socket.set_nonblocking(true).map_err(|e| {
            warn!("UDP: set_nonblocking failed ({})", e);
            TransportError::BindFailed
        })?;
        if let Ok(local) = socket.local_addr() {
            info!("UDP: listening on {}", local);
        }
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }
}

impl DatagramPort for UdpTransport {
    fn try_receive(
        &mut self,
        buf: &mut [u8],
    ) -> Result<Option<(usize, SocketAddr)>, TransportError> {
        match self.socket.recv_from(buf) {
            Ok((len, peer)) => Ok(Some((len, peer))),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => {
                debug!("UDP: recv_from failed ({})", e);
                Err(TransportError::ReceiveFailed)
            }
        }
    }

    fn send(&mut self, peer: SocketAddr, data: &[u8]) -> Result<(), TransportError> {
        match self.socket.send_to(data, peer) {
            Ok(n) if n == data.len() => Ok(()),
            Ok(n) => {
                debug!("UDP: short send to {} ({}/{} B)", peer, n, data.len());
                Err(TransportError::SendFailed)
            }
            Err(e) => {
                debug!("UDP: send_to {} failed ({})", peer, e);
                Err(TransportError::SendFailed)
            }
        }
    }
}

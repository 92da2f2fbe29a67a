//! UDP transport
//!
//! The engine writes datagrams through [`DatagramTransport`] so a send pass can
//! run against something other than a real socket.

use std::io;
use std::net::{SocketAddr, SocketAddrV4, UdpSocket};

use crate::{config::EngineConfig, error::ArtNetError, Result};

/// Anything that can send one datagram to an address
pub trait DatagramTransport {
    fn send_datagram(&self, payload: &[u8], target: SocketAddr) -> io::Result<()>;
}

impl DatagramTransport for UdpSocket {
    fn send_datagram(&self, payload: &[u8], target: SocketAddr) -> io::Result<()> {
        let written = self.send_to(payload, target)?;
        if written != payload.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", written, payload.len()),
            ));
        }
        Ok(())
    }
}

/// Open the engine socket described by `config`
///
/// The socket is bound, switched to non-blocking mode and, for broadcast
/// destinations, allowed to send broadcast.
pub fn open_socket(config: &EngineConfig) -> Result<UdpSocket> {
    let socket = UdpSocket::bind(SocketAddr::V4(config.bind))
        .map_err(|e| ArtNetError::socket("binding", e))?;

    if config.is_broadcast() {
        socket
            .set_broadcast(true)
            .map_err(|e| ArtNetError::socket("enabling broadcast", e))?;
    }

    socket
        .set_nonblocking(true)
        .map_err(|e| ArtNetError::socket("switching to non-blocking mode", e))?;

    Ok(socket)
}

/// Local address of a bound socket, IPv4 only
pub fn local_v4(socket: &UdpSocket) -> Option<SocketAddrV4> {
    match socket.local_addr() {
        Ok(SocketAddr::V4(addr)) => Some(addr),
        _ => None,
    }
}

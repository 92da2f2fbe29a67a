//! ArtDmx packet codec (Art-Net 4)
//!
//! Pure functions that frame a universe buffer as an ArtDmx (OpDmx) datagram
//! and parse one back. Nothing here holds state, so every function is safe to
//! call from any thread.
//!
//! ```text
//! 0..8    "Art-Net\0"
//! 8..10   OpCode 0x5000 (little-endian)
//! 10..12  Protocol version 14 (big-endian)
//! 12      Sequence (0 = disabled)
//! 13      Physical port
//! 14      SubUni
//! 15      Net
//! 16..18  Length (big-endian, even, 2-512)
//! 18..    DMX data
//! ```

use crate::{address::UniverseAddress, error::ArtNetError, Result};

/// Packet ID, including the NUL terminator
pub const ART_NET_ID: &[u8; 8] = b"Art-Net\0";
/// OpDmx
pub const OP_DMX: u16 = 0x5000;
pub const PROTOCOL_VERSION: u16 = 14;
pub const HEADER_LEN: usize = 18;
pub const MIN_CHANNELS: usize = 2;
pub const MAX_CHANNELS: usize = 512;
/// Largest ArtDmx datagram
pub const MAX_PACKET_LEN: usize = HEADER_LEN + MAX_CHANNELS;
/// Art-Net UDP port
pub const DEFAULT_PORT: u16 = 6454;

/// A decoded ArtDmx datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtDmxPacket {
    pub sequence: u8,
    pub physical: u8,
    pub address: UniverseAddress,
    /// Channel data as carried on the wire (always the declared length)
    pub data: Vec<u8>,
}

/// Number of channel bytes that go on the wire for `len` input channels
///
/// Odd and zero counts are rounded up to the next even value.
pub fn wire_length(len: usize) -> Result<usize> {
    if len > MAX_CHANNELS {
        return Err(ArtNetError::MalformedPacket(format!(
            "{} channels exceeds the maximum of {}",
            len, MAX_CHANNELS
        )));
    }
    Ok((len + (len & 1)).max(MIN_CHANNELS))
}

/// Encode an ArtDmx datagram into `out`, replacing its contents
///
/// Reusing `out` across calls avoids one allocation per packet.
pub fn encode_into(
    address: UniverseAddress,
    sequence: u8,
    channels: &[u8],
    out: &mut Vec<u8>,
) -> Result<()> {
    let length = wire_length(channels.len())?;

    out.clear();
    out.reserve(HEADER_LEN + length);

    // Header: "Art-Net\0"
    out.extend_from_slice(ART_NET_ID);

    // OpCode: OpDmx (0x5000)
    out.extend_from_slice(&OP_DMX.to_le_bytes());

    // Protocol version (14)
    out.extend_from_slice(&PROTOCOL_VERSION.to_be_bytes());

    out.push(sequence);

    // Physical (0)
    out.push(0);

    // Port-Address, low byte first
    out.push(address.sub_uni());
    out.push(address.net_byte());

    // Length (big-endian)
    out.extend_from_slice(&(length as u16).to_be_bytes());

    // DMX data, zero padded to the even length
    out.extend_from_slice(channels);
    out.resize(HEADER_LEN + length, 0);

    Ok(())
}

/// Encode an ArtDmx datagram into a new buffer
pub fn encode(address: UniverseAddress, sequence: u8, channels: &[u8]) -> Result<Vec<u8>> {
    let mut packet = Vec::with_capacity(MAX_PACKET_LEN);
    encode_into(address, sequence, channels, &mut packet)?;
    Ok(packet)
}

/// Parse and validate an ArtDmx datagram
pub fn decode(packet: &[u8]) -> Result<ArtDmxPacket> {
    if packet.len() < HEADER_LEN {
        return Err(ArtNetError::MalformedPacket(format!(
            "{} bytes is shorter than the {} byte header",
            packet.len(),
            HEADER_LEN
        )));
    }

    if &packet[0..8] != ART_NET_ID {
        return Err(ArtNetError::MalformedPacket(
            "missing Art-Net ID".to_string(),
        ));
    }

    let opcode = u16::from_le_bytes([packet[8], packet[9]]);
    if opcode != OP_DMX {
        return Err(ArtNetError::MalformedPacket(format!(
            "unexpected OpCode {:#06x}",
            opcode
        )));
    }

    let version = u16::from_be_bytes([packet[10], packet[11]]);
    if version != PROTOCOL_VERSION {
        return Err(ArtNetError::MalformedPacket(format!(
            "unsupported protocol version {}",
            version
        )));
    }

    let sub_uni = packet[14];
    let net = packet[15];
    if net > crate::address::MAX_NET {
        return Err(ArtNetError::MalformedPacket(format!(
            "net byte {:#04x} has the high bit set",
            net
        )));
    }

    let length = u16::from_be_bytes([packet[16], packet[17]]) as usize;
    if !(MIN_CHANNELS..=MAX_CHANNELS).contains(&length) {
        return Err(ArtNetError::MalformedPacket(format!(
            "length {} outside {}-{}",
            length, MIN_CHANNELS, MAX_CHANNELS
        )));
    }

    let data = &packet[HEADER_LEN..];
    if data.len() != length {
        return Err(ArtNetError::MalformedPacket(format!(
            "declared length {} but {} data bytes follow",
            length,
            data.len()
        )));
    }

    let address = UniverseAddress::new(net, sub_uni >> 4, sub_uni & 0x0F)
        .map_err(|e| ArtNetError::MalformedPacket(e.to_string()))?;

    Ok(ArtDmxPacket {
        sequence: packet[12],
        physical: packet[13],
        address,
        data: data.to_vec(),
    })
}

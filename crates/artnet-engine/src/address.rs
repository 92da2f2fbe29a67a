//! Art-Net universe addressing
//!
//! An Art-Net 4 Port-Address is 15 bits wide and split into three fields:
//! - Net (7 bits, 0-127)
//! - Sub-Net (4 bits, 0-15)
//! - Universe (4 bits, 0-15)

use std::fmt;

use crate::{error::ArtNetError, Result};

pub const MAX_NET: u8 = 0x7F;
pub const MAX_SUBNET: u8 = 0x0F;
pub const MAX_UNIVERSE: u8 = 0x0F;
pub const MAX_PORT_ADDRESS: u16 = 0x7FFF;

/// Identifies one DMX universe on the Art-Net network
///
/// Fields are always within their bit widths; constructors reject
/// out-of-range values instead of masking them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct UniverseAddress {
    net: u8,
    subnet: u8,
    universe: u8,
}

impl UniverseAddress {
    /// Create an address from its three parts
    pub fn new(net: u8, subnet: u8, universe: u8) -> Result<Self> {
        if net > MAX_NET {
            return Err(ArtNetError::invalid_config(
                "net",
                format!("{} is out of range (must be 0-{})", net, MAX_NET),
            ));
        }
        if subnet > MAX_SUBNET {
            return Err(ArtNetError::invalid_config(
                "subnet",
                format!("{} is out of range (must be 0-{})", subnet, MAX_SUBNET),
            ));
        }
        if universe > MAX_UNIVERSE {
            return Err(ArtNetError::invalid_config(
                "universe",
                format!("{} is out of range (must be 0-{})", universe, MAX_UNIVERSE),
            ));
        }

        Ok(Self {
            net,
            subnet,
            universe,
        })
    }

    /// Split a 15-bit Port-Address into net / subnet / universe
    pub fn from_port_address(port_address: u16) -> Result<Self> {
        if port_address > MAX_PORT_ADDRESS {
            return Err(ArtNetError::invalid_config(
                "universe",
                format!(
                    "port address {} is out of range (must be 0-{})",
                    port_address, MAX_PORT_ADDRESS
                ),
            ));
        }

        Ok(Self {
            net: (port_address >> 8) as u8,
            subnet: ((port_address >> 4) & 0x0F) as u8,
            universe: (port_address & 0x0F) as u8,
        })
    }

    pub fn net(&self) -> u8 {
        self.net
    }

    pub fn subnet(&self) -> u8 {
        self.subnet
    }

    pub fn universe(&self) -> u8 {
        self.universe
    }

    /// Combined 15-bit Port-Address
    pub fn port_address(&self) -> u16 {
        ((self.net as u16) << 8) | self.sub_uni() as u16
    }

    /// The `SubUni` byte of an ArtDmx header
    pub fn sub_uni(&self) -> u8 {
        (self.subnet << 4) | self.universe
    }

    /// The `Net` byte of an ArtDmx header
    pub fn net_byte(&self) -> u8 {
        self.net & MAX_NET
    }
}

impl fmt::Display for UniverseAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.net, self.subnet, self.universe)
    }
}

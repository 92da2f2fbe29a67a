//! Engine configuration
//!
//! [`ArtNetSettings`] carries the raw values a host supplies (or a TOML file
//! contains). [`ArtNetSettings::validate`] turns them into an immutable
//! [`EngineConfig`] or reports the first field that is out of range.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{address::UniverseAddress, codec::DEFAULT_PORT, error::ArtNetError, Result};

/// Unvalidated engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtNetSettings {
    pub bind_address: String,
    /// Local port, also used as the destination port unless overridden
    pub port: u32,
    pub net: u32,
    pub subnet: u32,
    pub universe: u32,
    #[serde(alias = "destination_address")]
    pub broadcast_address: String,
    /// Send to a port other than the bound one
    pub destination_port: Option<u16>,
    /// Put sequence numbers on the wire (0 is sent when disabled)
    pub sequencing: bool,
}

impl Default for ArtNetSettings {
    fn default() -> Self {
        Self {
            bind_address: Ipv4Addr::UNSPECIFIED.to_string(),
            port: DEFAULT_PORT as u32,
            net: 0,
            subnet: 0,
            universe: 0,
            broadcast_address: Ipv4Addr::BROADCAST.to_string(),
            destination_port: None,
            sequencing: true,
        }
    }
}

impl ArtNetSettings {
    /// Settings for a bind address and port, everything else default
    pub fn new(bind_address: impl Into<String>, port: u32) -> Self {
        Self {
            bind_address: bind_address.into(),
            port,
            ..Default::default()
        }
    }

    /// Set the base universe address
    pub fn with_address(mut self, net: u32, subnet: u32, universe: u32) -> Self {
        self.net = net;
        self.subnet = subnet;
        self.universe = universe;
        self
    }

    /// Set the destination (broadcast or unicast) address
    pub fn with_destination(mut self, address: impl Into<String>) -> Self {
        self.broadcast_address = address.into();
        self
    }

    /// Override the destination port
    pub fn with_destination_port(mut self, port: u16) -> Self {
        self.destination_port = Some(port);
        self
    }

    /// Enable or disable sequence numbers
    pub fn with_sequencing(mut self, enabled: bool) -> Self {
        self.sequencing = enabled;
        self
    }

    /// Parse settings from TOML
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check every field and build the immutable config
    pub fn validate(&self) -> Result<EngineConfig> {
        let bind_ip = parse_ipv4("bind_address", &self.bind_address)?;
        let destination_ip = parse_ipv4("broadcast_address", &self.broadcast_address)?;

        let port = u16::try_from(self.port).map_err(|_| {
            ArtNetError::invalid_config(
                "port",
                format!("{} is out of range (must be 0-65535)", self.port),
            )
        })?;

        let destination_port = match self.destination_port {
            Some(0) => {
                return Err(ArtNetError::invalid_config(
                    "destination_port",
                    "must not be 0",
                ))
            }
            Some(p) => p,
            None if port == 0 => {
                return Err(ArtNetError::invalid_config(
                    "port",
                    "0 is only allowed together with an explicit destination_port",
                ))
            }
            None => port,
        };

        let base_address = UniverseAddress::new(
            narrow("net", self.net)?,
            narrow("subnet", self.subnet)?,
            narrow("universe", self.universe)?,
        )?;

        Ok(EngineConfig {
            bind: SocketAddrV4::new(bind_ip, port),
            destination: SocketAddrV4::new(destination_ip, destination_port),
            base_address,
            sequencing: self.sequencing,
        })
    }
}

fn parse_ipv4(field: &'static str, value: &str) -> Result<Ipv4Addr> {
    value.trim().parse().map_err(|e| {
        ArtNetError::invalid_config(field, format!("'{}' is not an IPv4 address: {}", value, e))
    })
}

fn narrow(field: &'static str, value: u32) -> Result<u8> {
    u8::try_from(value)
        .map_err(|_| ArtNetError::invalid_config(field, format!("{} is out of range", value)))
}

/// Validated, immutable engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub bind: SocketAddrV4,
    pub destination: SocketAddrV4,
    /// Used when the host does not name a universe
    pub base_address: UniverseAddress,
    pub sequencing: bool,
}

impl EngineConfig {
    /// Whether the socket needs `SO_BROADCAST` to reach the destination
    pub fn is_broadcast(&self) -> bool {
        is_broadcast_address(*self.destination.ip())
    }
}

/// Limited broadcast, or a last octet of 255
///
/// A heuristic, not a subnet-aware check: the netmask is unknown here, so a
/// unicast host ending in `.255` on a /23 or wider network also matches.
/// Enabling `SO_BROADCAST` for such a host is harmless.
pub fn is_broadcast_address(ip: Ipv4Addr) -> bool {
    ip.is_broadcast() || ip.octets()[3] == 255
}

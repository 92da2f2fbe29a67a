//! Error types for the Art-Net engine
use thiserror::Error;

use crate::address::UniverseAddress;

/// Art-Net engine errors
#[derive(Error, Debug)]
pub enum ArtNetError {
    /// A configuration field failed validation
    #[error("Invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Settings file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O error outside the socket path (e.g. reading a settings file)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// OS-level failure while opening, binding or configuring the socket
    #[error("Socket error while {context}: {source}")]
    SocketError {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// `start` was called before a successful `configure`
    #[error("Engine is not configured")]
    NotConfigured,

    /// Operation requires a running engine
    #[error("Engine is not running")]
    NotRunning,

    /// Operation is not allowed while the engine is running
    #[error("Engine is already running")]
    AlreadyRunning,

    /// Channel data with no channels at all
    #[error("DMX data must contain at least one channel")]
    EmptyDmxData,

    /// Bytes that are not a valid ArtDmx datagram
    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    /// A send pass stopped at the first universe that failed to transmit
    #[error(
        "Send aborted at universe {failed}: {source} ({} sent, {} skipped)",
        .sent.len(),
        .skipped.len()
    )]
    SendAborted {
        sent: Vec<UniverseAddress>,
        failed: UniverseAddress,
        skipped: Vec<UniverseAddress>,
        #[source]
        source: std::io::Error,
    },
}

impl ArtNetError {
    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        ArtNetError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn socket(context: &'static str, source: std::io::Error) -> Self {
        ArtNetError::SocketError { context, source }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, ArtNetError>;

//! Art-Net DMX Engine - DMX512 over Ethernet
//!
//! This crate drives stage-lighting fixtures with Art-Net 4 ArtDmx packets:
//! - **Addressing**: Net / Sub-Net / Universe with strict range checks
//! - **Codec**: ArtDmx framing and parsing, no I/O
//! - **Universe store**: thread-safe per-universe buffers and sequence counters
//! - **Engine**: configuration, socket lifecycle and send passes
//! - **Host controller**: a flat boolean API for scripting hosts
//!
//! The engine is transmit-only and never runs its own timer; the host calls
//! [`ArtNetEngine::send_dmx`] at whatever rate it wants (typically ~40 Hz).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use artnet_engine::{ArtNetEngine, ArtNetSettings, UniverseAddress};
//!
//! # fn main() -> artnet_engine::Result<()> {
//! let engine = ArtNetEngine::new();
//! engine.configure(&ArtNetSettings::new("0.0.0.0", 6454).with_address(0, 0, 1))?;
//! engine.start()?;
//!
//! let universe = UniverseAddress::new(0, 0, 1)?;
//! engine.set_dmx_data(Some(universe), &[255, 0, 128])?;
//! engine.send_dmx()?;
//!
//! engine.stop();
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`address`] - Universe addressing
//! - [`codec`] - ArtDmx packet encoding and decoding
//! - [`universe`] - Universe buffer store
//! - [`config`] - Settings and validated configuration
//! - [`engine`] - Transmission engine
//! - [`transport`] - UDP socket setup and the datagram seam
//! - [`host`] - Boolean host API
//! - [`error`] - Error types

/// Universe addressing
pub mod address;
/// ArtDmx packet codec
pub mod codec;
/// Settings and validated configuration
pub mod config;
/// Transmission engine
pub mod engine;
/// Error types
pub mod error;
/// Host-facing controller
pub mod host;
/// UDP transport
pub mod transport;
/// Universe buffer store
pub mod universe;

// Re-exports
pub use address::UniverseAddress;
pub use codec::{ArtDmxPacket, DEFAULT_PORT};
pub use config::{ArtNetSettings, EngineConfig};
pub use engine::{ArtNetEngine, EngineState, SendReport};
pub use error::{ArtNetError, Result};
pub use host::ArtNetController;
pub use transport::DatagramTransport;
pub use universe::{DmxBuffer, StoreWrite, UniverseStore};

//! Art-Net transmission engine
//!
//! Owns the configuration and the UDP socket, and turns the contents of the
//! [`UniverseStore`] into ArtDmx datagrams whenever the host calls
//! [`ArtNetEngine::send_dmx`]. The engine runs no threads or timers of its own;
//! the host decides the send rate (typically ~40 Hz).
//!
//! ```text
//! Unconfigured --configure--> Configured --start--> Running
//!                                 ^                    |
//!                                 +-------stop---------+
//! ```

use std::net::{SocketAddr, SocketAddrV4, UdpSocket};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    address::UniverseAddress,
    codec,
    config::{ArtNetSettings, EngineConfig},
    error::ArtNetError,
    transport::{self, DatagramTransport},
    universe::{DmxBuffer, StoreWrite, UniverseStore},
    Result,
};

/// Lifecycle state of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Unconfigured,
    /// Config present, no socket (also the state after `stop`)
    Configured,
    Running,
}

/// Universes transmitted by one successful send pass, in send order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReport {
    pub sent: Vec<UniverseAddress>,
}

impl SendReport {
    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }
}

#[derive(Debug)]
struct Lifecycle {
    state: EngineState,
    config: Option<EngineConfig>,
    socket: Option<Arc<UdpSocket>>,
}

/// Art-Net DMX transmitter
///
/// All methods take `&self`; the engine can be shared between a control
/// thread (configure / start / stop) and a data thread (set / send).
#[derive(Debug)]
pub struct ArtNetEngine {
    lifecycle: Mutex<Lifecycle>,
    store: UniverseStore,
    /// Packet scratch buffer; holding it also serializes send passes
    pass_scratch: Mutex<Vec<u8>>,
}

impl Default for ArtNetEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtNetEngine {
    /// Create an unconfigured engine
    pub fn new() -> Self {
        Self {
            lifecycle: Mutex::new(Lifecycle {
                state: EngineState::Unconfigured,
                config: None,
                socket: None,
            }),
            store: UniverseStore::new(),
            pass_scratch: Mutex::new(Vec::with_capacity(codec::MAX_PACKET_LEN)),
        }
    }

    /// Validate and store a configuration
    ///
    /// Rejected while running. A failed validation leaves the previous
    /// state and config untouched.
    pub fn configure(&self, settings: &ArtNetSettings) -> Result<EngineConfig> {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.state == EngineState::Running {
            return Err(ArtNetError::AlreadyRunning);
        }

        let config = settings.validate()?;
        lifecycle.config = Some(config);
        lifecycle.state = EngineState::Configured;

        tracing::info!(
            "Art-Net engine configured: bind {} -> {}, base universe {}",
            config.bind,
            config.destination,
            config.base_address
        );

        Ok(config)
    }

    /// Open the socket and start accepting `send_dmx` calls
    ///
    /// On failure the engine stays `Configured`.
    pub fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        let config = match (lifecycle.state, lifecycle.config) {
            (EngineState::Running, _) => return Err(ArtNetError::AlreadyRunning),
            (_, None) => return Err(ArtNetError::NotConfigured),
            (_, Some(config)) => config,
        };

        let socket = transport::open_socket(&config).map_err(|e| {
            tracing::warn!("Failed to start Art-Net engine: {}", e);
            e
        })?;

        let local = transport::local_v4(&socket).unwrap_or(config.bind);
        lifecycle.socket = Some(Arc::new(socket));
        lifecycle.state = EngineState::Running;

        tracing::info!(
            "Art-Net engine started on {} -> {} (broadcast: {})",
            local,
            config.destination,
            config.is_broadcast()
        );

        Ok(())
    }

    /// Close the socket and return to `Configured`
    ///
    /// Safe to call in any state, any number of times. Waits for an
    /// in-flight send pass to finish, so the socket is closed (and its port
    /// free again) once this returns.
    pub fn stop(&self) {
        // Same lock order as `send_dmx`: pass first, then lifecycle
        let _pass = self.pass_scratch.lock();
        let mut lifecycle = self.lifecycle.lock();
        let socket = lifecycle.socket.take();

        lifecycle.state = if lifecycle.config.is_some() {
            EngineState::Configured
        } else {
            EngineState::Unconfigured
        };

        if let Some(socket) = socket {
            drop(socket);
            tracing::info!("Art-Net engine stopped");
        }
    }

    pub fn state(&self) -> EngineState {
        self.lifecycle.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == EngineState::Running
    }

    /// Current configuration, if any
    pub fn config(&self) -> Option<EngineConfig> {
        self.lifecycle.lock().config
    }

    /// Address the socket is bound to while running
    pub fn local_addr(&self) -> Option<SocketAddrV4> {
        self.lifecycle
            .lock()
            .socket
            .as_deref()
            .and_then(transport::local_v4)
    }

    /// Stage channel data for a universe
    ///
    /// `None` targets the configured base address (0:0:0 before any
    /// configuration). Works in every state, so buffers can be filled
    /// before `start`.
    pub fn set_dmx_data(
        &self,
        address: Option<UniverseAddress>,
        channels: &[u8],
    ) -> Result<StoreWrite> {
        let address = match address {
            Some(address) => address,
            None => self.base_address(),
        };
        self.store.set(address, channels)
    }

    /// Universes written so far, in send order
    pub fn universes(&self) -> Vec<UniverseAddress> {
        self.store.addresses()
    }

    /// Copy of one universe's buffer
    pub fn buffer(&self, address: UniverseAddress) -> Option<DmxBuffer> {
        self.store.get(address)
    }

    /// Transmit every known universe once
    ///
    /// Stops at the first universe that fails to send and returns
    /// [`ArtNetError::SendAborted`]; the socket stays open and the failed
    /// universe keeps its sequence number for the next pass.
    pub fn send_dmx(&self) -> Result<SendReport> {
        let mut scratch = self.pass_scratch.lock();

        let (socket, config) = {
            let lifecycle = self.lifecycle.lock();
            match (lifecycle.state, &lifecycle.socket, lifecycle.config) {
                (EngineState::Running, Some(socket), Some(config)) => {
                    (Arc::clone(socket), config)
                }
                _ => return Err(ArtNetError::NotRunning),
            }
        };

        send_pass(&self.store, socket.as_ref(), &config, &mut scratch)
    }

    fn base_address(&self) -> UniverseAddress {
        self.lifecycle
            .lock()
            .config
            .map(|config| config.base_address)
            .unwrap_or_default()
    }
}

/// Encode and transmit a snapshot of `store` through `transport`
///
/// The store lock is only held while the snapshot is copied.
pub(crate) fn send_pass<T: DatagramTransport + ?Sized>(
    store: &UniverseStore,
    transport: &T,
    config: &EngineConfig,
    scratch: &mut Vec<u8>,
) -> Result<SendReport> {
    let target = SocketAddr::V4(config.destination);
    let snapshot = store.snapshot();
    let mut sent = Vec::with_capacity(snapshot.len());
    let mut pending = snapshot.into_iter();

    while let Some((address, buffer)) = pending.next() {
        let sequence = if config.sequencing { buffer.sequence } else { 0 };
        codec::encode_into(address, sequence, &buffer.channels, scratch)?;

        if let Err(source) = transport.send_datagram(scratch, target) {
            let skipped: Vec<_> = pending.map(|(address, _)| address).collect();
            tracing::warn!(
                "Art-Net send to {} failed for universe {}: {} ({} sent, {} skipped)",
                target,
                address,
                source,
                sent.len(),
                skipped.len()
            );
            return Err(ArtNetError::SendAborted {
                sent,
                failed: address,
                skipped,
                source,
            });
        }

        store.advance_sequence(address);
        tracing::trace!(
            "Sent ArtDmx universe {} seq {} ({} bytes)",
            address,
            sequence,
            scratch.len()
        );
        sent.push(address);
    }

    Ok(SendReport { sent })
}

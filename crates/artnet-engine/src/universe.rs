//! Universe store
//!
//! Holds the latest channel buffer and sequence counter for every universe the
//! host has written to. A single coarse lock covers the whole store; DMX rates
//! are tens of Hz and buffers are at most 512 bytes, so contention is not a concern.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::{address::UniverseAddress, codec::MAX_CHANNELS, error::ArtNetError, Result};

/// First sequence number emitted for a universe
pub const FIRST_SEQUENCE: u8 = 1;

/// Live channel data for one universe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmxBuffer {
    pub channels: Vec<u8>,
    /// Next sequence number to put on the wire (1-255)
    pub sequence: u8,
}

impl DmxBuffer {
    fn new() -> Self {
        Self {
            channels: Vec::with_capacity(MAX_CHANNELS),
            sequence: FIRST_SEQUENCE,
        }
    }
}

/// Outcome of a successful [`UniverseStore::set`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreWrite {
    Stored,
    /// Input was longer than 512 channels; the tail was dropped
    Truncated { dropped: usize },
}

/// Advance a sequence number, wrapping 255 -> 1 and never producing 0
pub fn next_sequence(sequence: u8) -> u8 {
    match sequence {
        255 => 1,
        0 => FIRST_SEQUENCE,
        n => n + 1,
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Insertion order
    order: Vec<UniverseAddress>,
    buffers: HashMap<UniverseAddress, DmxBuffer>,
}

/// Thread-safe map of universe address to its current buffer
#[derive(Debug, Default)]
pub struct UniverseStore {
    inner: Mutex<StoreInner>,
}

impl UniverseStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the channel data of a universe, creating it if needed
    ///
    /// More than 512 channels are truncated with a warning. The sequence
    /// counter is left untouched.
    pub fn set(&self, address: UniverseAddress, channels: &[u8]) -> Result<StoreWrite> {
        if channels.is_empty() {
            return Err(ArtNetError::EmptyDmxData);
        }

        let (accepted, outcome) = if channels.len() > MAX_CHANNELS {
            let dropped = channels.len() - MAX_CHANNELS;
            tracing::warn!(
                "DMX data for universe {} has {} channels, dropping the last {}",
                address,
                channels.len(),
                dropped
            );
            (&channels[..MAX_CHANNELS], StoreWrite::Truncated { dropped })
        } else {
            (channels, StoreWrite::Stored)
        };

        let mut inner = self.inner.lock();
        let StoreInner { order, buffers } = &mut *inner;
        let buffer = buffers.entry(address).or_insert_with(|| {
            tracing::debug!("Created DMX buffer for universe {}", address);
            order.push(address);
            DmxBuffer::new()
        });

        buffer.channels.clear();
        buffer.channels.extend_from_slice(accepted);

        Ok(outcome)
    }

    /// Copy every universe as it stands right now, in insertion order
    pub fn snapshot(&self) -> Vec<(UniverseAddress, DmxBuffer)> {
        let inner = self.inner.lock();
        inner
            .order
            .iter()
            .filter_map(|address| {
                inner
                    .buffers
                    .get(address)
                    .map(|buffer| (*address, buffer.clone()))
            })
            .collect()
    }

    /// Move a universe to its next sequence number
    ///
    /// Returns the new value, or `None` if the universe is unknown.
    pub fn advance_sequence(&self, address: UniverseAddress) -> Option<u8> {
        let mut inner = self.inner.lock();
        inner.buffers.get_mut(&address).map(|buffer| {
            buffer.sequence = next_sequence(buffer.sequence);
            buffer.sequence
        })
    }

    /// Copy of a single universe
    pub fn get(&self, address: UniverseAddress) -> Option<DmxBuffer> {
        self.inner.lock().buffers.get(&address).cloned()
    }

    /// Known universes in insertion order
    pub fn addresses(&self) -> Vec<UniverseAddress> {
        self.inner.lock().order.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().order.is_empty()
    }
}

//! Channel-backed link for testing without radio hardware.
//!
//! [`SimulatedLink`] implements [`GattLink`] over a pair of in-process
//! channels; the matching [`SimulatedPeer`] plays the fan controller side.
//! Chunk ordering matches real-link behavior: notifications arrive in the
//! order the peer sent them, and a disconnect terminates the event stream.
//!
//! # Example
//!
//! ```
//! use quietcool::ble::simulated::SimulatedLink;
//!
//! let (link, peer) = SimulatedLink::pair("ATTICFAN-TEST", 20);
//! peer.notify(br#"{"Result":"Success"}"#.to_vec());
//! ```

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{Error, Result};

use super::{GattLink, LinkEvent};

// ============================================================================
// SimulatedLink
// ============================================================================

/// In-process [`GattLink`] implementation.
///
/// Created together with its [`SimulatedPeer`] via [`SimulatedLink::pair`].
pub struct SimulatedLink {
    /// Advertised peer name reported to the transport.
    peer_name: String,
    /// Maximum per-write payload size.
    max_write: usize,
    /// Inbound events, handed to the transport once.
    events_rx: Option<mpsc::UnboundedReceiver<LinkEvent>>,
    /// Sender side of the event stream, used by `close()`.
    events_tx: mpsc::UnboundedSender<LinkEvent>,
    /// Chunks written by the transport, observed by the peer.
    writes_tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl SimulatedLink {
    /// Creates a connected link/peer pair.
    ///
    /// `max_write` is the per-write payload limit the transport will
    /// fragment against.
    #[must_use]
    pub fn pair(peer_name: impl Into<String>, max_write: usize) -> (Self, SimulatedPeer) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (writes_tx, writes_rx) = mpsc::unbounded_channel();

        let link = Self {
            peer_name: peer_name.into(),
            max_write,
            events_rx: Some(events_rx),
            events_tx: events_tx.clone(),
            writes_tx,
        };

        let peer = SimulatedPeer {
            events_tx,
            writes_rx,
        };

        (link, peer)
    }
}

#[async_trait]
impl GattLink for SimulatedLink {
    fn peer_name(&self) -> &str {
        &self.peer_name
    }

    fn max_write_size(&self) -> usize {
        self.max_write
    }

    async fn write_chunk(&self, chunk: &[u8]) -> Result<()> {
        self.writes_tx
            .send(chunk.to_vec())
            .map_err(|_| Error::connection("simulated peer dropped"))
    }

    fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<LinkEvent>> {
        self.events_rx.take()
    }

    async fn close(&self) -> Result<()> {
        // Mirrors the real stack: teardown surfaces as a disconnect event.
        let _ = self.events_tx.send(LinkEvent::Disconnected);
        Ok(())
    }
}

// ============================================================================
// SimulatedPeer
// ============================================================================

/// The fan-controller side of a [`SimulatedLink`].
///
/// Tests drive it directly: observe the chunks the transport wrote,
/// deliver notification payloads, and drop the link on demand.
pub struct SimulatedPeer {
    /// Event stream into the transport.
    events_tx: mpsc::UnboundedSender<LinkEvent>,
    /// Chunks the transport wrote, in order.
    writes_rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl SimulatedPeer {
    /// Delivers one notification payload.
    pub fn notify(&self, bytes: Vec<u8>) {
        let _ = self.events_tx.send(LinkEvent::Notification(bytes));
    }

    /// Delivers a payload split into notifications of at most
    /// `chunk_size` bytes, in order.
    pub fn notify_chunked(&self, payload: &[u8], chunk_size: usize) {
        for chunk in payload.chunks(chunk_size) {
            self.notify(chunk.to_vec());
        }
    }

    /// Serializes a JSON value and delivers it as one notification.
    pub fn respond(&self, value: &Value) {
        self.notify(value.to_string().into_bytes());
    }

    /// Drops the link from the peer side.
    pub fn disconnect(&self) {
        let _ = self.events_tx.send(LinkEvent::Disconnected);
    }

    /// Receives the next chunk the transport wrote.
    pub async fn next_chunk(&mut self) -> Option<Vec<u8>> {
        self.writes_rx.recv().await
    }

    /// Accumulates written chunks until they parse as one JSON value.
    ///
    /// This is the same framing rule the real controller applies: the
    /// request boundary is wherever the bytes first form valid JSON.
    pub async fn recv_request(&mut self) -> Option<Value> {
        let mut buf = Vec::new();
        while let Some(chunk) = self.writes_rx.recv().await {
            buf.extend_from_slice(&chunk);
            if let Ok(value) = serde_json::from_slice::<Value>(&buf) {
                return Some(value);
            }
        }
        None
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Transport engine: one-request/one-response exchanges over a chunked,
//! notification-driven link.
//!
//! # Event Loop
//!
//! The transport spawns a tokio task that consumes [`LinkEvent`]s:
//!
//! - Notification chunks feed the [`AssemblyBuffer`]; a completed frame
//!   resolves the pending request exactly once
//! - A disconnect clears the connected flag, fails the pending request
//!   with [`Error::Disconnected`], and terminates the loop
//!
//! # Request Discipline
//!
//! The wire protocol carries no request identifiers, so responses are
//! correlated purely by order: one request may be outstanding at a time.
//! The pending slot enforces this; a second [`Transport::send_request`]
//! while one is in flight fails fast with [`Error::RequestInFlight`].

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use crate::ble::{GattLink, LinkEvent};
use crate::error::{Error, Result};

use super::assembly::AssemblyBuffer;

// ============================================================================
// Types
// ============================================================================

/// Single-slot rendezvous between the suspended caller and the event loop.
type PendingSlot = Arc<Mutex<Option<oneshot::Sender<Result<Value>>>>>;

// ============================================================================
// Transport
// ============================================================================

/// Reliable one-request/one-response exchange over a chunked link.
///
/// Owned exclusively by one [`Session`](crate::session::Session); after a
/// peer disconnect the instance is unusable and must be replaced by a
/// fresh bring-up.
pub struct Transport {
    /// The underlying link, used for acknowledged chunk writes.
    link: Arc<dyn GattLink>,
    /// Cleared on peer disconnect or teardown.
    connected: Arc<AtomicBool>,
    /// The single pending-request slot (shared with the event loop).
    pending: PendingSlot,
    /// Per-write payload limit negotiated at bring-up.
    max_write: usize,
}

impl Transport {
    /// Wires the engine onto an established link.
    ///
    /// Spawns the event-loop task internally.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the link's event stream was
    /// already consumed.
    pub fn new(mut link: impl GattLink + 'static) -> Result<Self> {
        let events = link
            .take_events()
            .ok_or_else(|| Error::connection("link event stream already taken"))?;

        let connected = Arc::new(AtomicBool::new(true));
        let pending: PendingSlot = Arc::new(Mutex::new(None));
        let max_write = link.max_write_size();

        tokio::spawn(Self::run_event_loop(
            events,
            Arc::clone(&connected),
            Arc::clone(&pending),
        ));

        debug!(peer = %link.peer_name(), max_write, "Transport up");

        Ok(Self {
            link: Arc::new(link),
            connected,
            pending,
            max_write,
        })
    }

    /// Returns `true` until the peer disconnects or the transport is
    /// torn down.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Name the peer advertised during discovery.
    #[inline]
    #[must_use]
    pub fn peer_name(&self) -> &str {
        self.link.peer_name()
    }

    /// Per-write payload limit.
    #[inline]
    #[must_use]
    pub fn max_write_size(&self) -> usize {
        self.max_write
    }

    /// Sends one complete request and awaits its complete response.
    ///
    /// The payload is split into chunks of at most the link's write
    /// limit (the final chunk may be shorter) and written in order, each
    /// acknowledged before the next. No framing markers are added: the
    /// peer's own JSON parser delimits the message.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if the transport already tore down
    /// - [`Error::RequestInFlight`] if another request is outstanding
    /// - [`Error::Disconnected`] if the peer drops the link mid-exchange
    /// - [`Error::MalformedFrame`] if reassembly exceeds its size cap
    pub async fn send_request(&self, payload: &[u8]) -> Result<Value> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let (response_tx, response_rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock();
            if pending.is_some() {
                return Err(Error::RequestInFlight);
            }
            *pending = Some(response_tx);
        }

        // The peer may have dropped between the connected check and the
        // slot install; the event loop only fails senders it can see.
        if !self.is_connected() {
            self.pending.lock().take();
            return Err(Error::Disconnected);
        }

        for chunk in payload.chunks(self.max_write) {
            if let Err(e) = self.link.write_chunk(chunk).await {
                self.pending.lock().take();
                return Err(e);
            }
            trace!(len = chunk.len(), "Chunk written");
        }

        match response_rx.await {
            Ok(result) => result,
            Err(_) => Err(Error::Disconnected),
        }
    }

    /// Tears down the transport and the link beneath it.
    ///
    /// Any suspended request fails with [`Error::Disconnected`] via the
    /// event loop.
    ///
    /// # Errors
    ///
    /// Returns a BLE stack error if the disconnect request fails; the
    /// transport is unusable either way.
    pub async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::Release);
        self.link.close().await
    }

    /// Event loop that drives inbound reassembly and disconnect handling.
    async fn run_event_loop(
        mut events: mpsc::UnboundedReceiver<LinkEvent>,
        connected: Arc<AtomicBool>,
        pending: PendingSlot,
    ) {
        let mut assembly = AssemblyBuffer::default();

        while let Some(event) = events.recv().await {
            match event {
                LinkEvent::Notification(bytes) => {
                    Self::handle_notification(&bytes, &mut assembly, &pending);
                }
                LinkEvent::Disconnected => {
                    debug!("Peer disconnected");
                    break;
                }
            }
        }

        // Link gone (peer drop or local teardown): wake any suspended
        // caller instead of leaving it blocked.
        connected.store(false, Ordering::Release);
        if let Some(tx) = pending.lock().take() {
            let _ = tx.send(Err(Error::Disconnected));
        }

        debug!("Event loop terminated");
    }

    /// Feeds one notification chunk through reassembly and resolves the
    /// pending request when a frame completes.
    fn handle_notification(bytes: &[u8], assembly: &mut AssemblyBuffer, pending: &PendingSlot) {
        match assembly.push(bytes) {
            // Partial frame: the steady state while a response streams in.
            Ok(None) => {}

            Ok(Some(frame)) => {
                if let Some(tx) = pending.lock().take() {
                    let _ = tx.send(Ok(frame));
                } else {
                    warn!(%frame, "Frame with no request outstanding, dropping");
                }
            }

            Err(e) => {
                if let Some(tx) = pending.lock().take() {
                    let _ = tx.send(Err(e));
                } else {
                    warn!(error = %e, "Reassembly failed with no request outstanding");
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use serde_json::json;

    use crate::ble::simulated::{SimulatedLink, SimulatedPeer};
    use crate::transport::assembly::MAX_ASSEMBLY_BYTES;

    fn transport_pair(max_write: usize) -> (Arc<Transport>, SimulatedPeer) {
        let (link, peer) = SimulatedLink::pair("ATTICFAN-TEST", max_write);
        let transport = Transport::new(link).expect("transport");
        (Arc::new(transport), peer)
    }

    #[tokio::test]
    async fn test_round_trip_single_chunk() {
        let (transport, mut peer) = transport_pair(64);

        let exchange = tokio::spawn({
            let transport = Arc::clone(&transport);
            async move { transport.send_request(br#"{"Api":"GetFanInfo"}"#).await }
        });

        let request = peer.recv_request().await.expect("request");
        assert_eq!(request["Api"], "GetFanInfo");

        peer.respond(&json!({"Result": "Success", "Name": "Attic"}));

        let response = exchange.await.expect("join").expect("response");
        assert_eq!(response["Name"], "Attic");
    }

    #[tokio::test]
    async fn test_round_trip_multi_chunk_both_directions() {
        // Request and response both exceed three chunks.
        let (transport, mut peer) = transport_pair(8);
        let request_payload = json!({"Api": "Login", "PhoneID": "aa4a737ffd756c6d"}).to_string();
        let response_payload = json!({
            "Result": "Success",
            "Name": "ATTICFAN-1234",
            "Model": "Trident Pro",
        });

        let exchange = tokio::spawn({
            let transport = Arc::clone(&transport);
            let payload = request_payload.clone();
            async move { transport.send_request(payload.as_bytes()).await }
        });

        let request = peer.recv_request().await.expect("request");
        assert_eq!(request["PhoneID"], "aa4a737ffd756c6d");

        peer.notify_chunked(response_payload.to_string().as_bytes(), 8);

        let response = exchange.await.expect("join").expect("response");
        assert_eq!(response, response_payload);
    }

    #[tokio::test]
    async fn test_chunk_sizes_respect_write_limit() {
        let (transport, mut peer) = transport_pair(5);
        let payload = br#"{"Api":"GetParameter"}"#;

        let exchange = tokio::spawn({
            let transport = Arc::clone(&transport);
            async move { transport.send_request(payload).await }
        });

        let mut reassembled = Vec::new();
        while reassembled.len() < payload.len() {
            let chunk = peer.next_chunk().await.expect("chunk");
            assert!(chunk.len() <= 5);
            reassembled.extend_from_slice(&chunk);
        }
        assert_eq!(reassembled, payload);

        peer.respond(&json!({"Result": "Success"}));
        exchange.await.expect("join").expect("response");
    }

    #[tokio::test]
    async fn test_second_request_fails_fast() {
        let (transport, mut peer) = transport_pair(64);

        let first = tokio::spawn({
            let transport = Arc::clone(&transport);
            async move { transport.send_request(br#"{"Api":"GetVersion"}"#).await }
        });

        // The first chunk arriving proves the slot is occupied.
        peer.next_chunk().await.expect("chunk");

        let err = transport
            .send_request(br#"{"Api":"GetPresets"}"#)
            .await
            .expect_err("second request must be rejected");
        assert!(matches!(err, Error::RequestInFlight));

        // The rejection must not disturb the outstanding exchange.
        peer.respond(&json!({"Result": "Success"}));
        first.await.expect("join").expect("response");
    }

    #[tokio::test]
    async fn test_disconnect_during_wait() {
        let (transport, mut peer) = transport_pair(64);

        let exchange = tokio::spawn({
            let transport = Arc::clone(&transport);
            async move { transport.send_request(br#"{"Api":"GetWorkState"}"#).await }
        });

        peer.next_chunk().await.expect("chunk");
        peer.disconnect();

        let err = exchange.await.expect("join").expect_err("must not hang");
        assert!(matches!(err, Error::Disconnected));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_send_after_disconnect_is_not_connected() {
        let (transport, peer) = transport_pair(64);

        peer.disconnect();
        // Let the event loop observe the drop.
        tokio::task::yield_now().await;
        while transport.is_connected() {
            tokio::task::yield_now().await;
        }

        let err = transport
            .send_request(br#"{"Api":"GetFanInfo"}"#)
            .await
            .expect_err("must fail");
        assert!(matches!(err, Error::NotConnected));
    }

    #[tokio::test]
    async fn test_reassembly_overflow_fails_request() {
        let (transport, mut peer) = transport_pair(64);

        let exchange = tokio::spawn({
            let transport = Arc::clone(&transport);
            async move { transport.send_request(br#"{"Api":"GetFanInfo"}"#).await }
        });

        peer.next_chunk().await.expect("chunk");

        // An opening brace followed by filler never parses.
        peer.notify(b"{".to_vec());
        peer.notify(vec![b' '; MAX_ASSEMBLY_BYTES + 1]);

        let err = exchange.await.expect("join").expect_err("overflow");
        assert!(matches!(err, Error::MalformedFrame { .. }));
    }

    #[tokio::test]
    async fn test_unsolicited_frame_does_not_poison_next_exchange() {
        let (transport, mut peer) = transport_pair(64);

        // Frame with nothing outstanding: logged and dropped.
        peer.respond(&json!({"Result": "Spurious"}));
        tokio::task::yield_now().await;

        let exchange = tokio::spawn({
            let transport = Arc::clone(&transport);
            async move { transport.send_request(br#"{"Api":"GetVersion"}"#).await }
        });

        peer.recv_request().await.expect("request");
        peer.respond(&json!({"Result": "Success"}));

        let response = exchange.await.expect("join").expect("response");
        assert_eq!(response["Result"], "Success");
    }

    proptest! {
        /// Chunks are bounded by the write limit and concatenate back to
        /// the original payload bit-for-bit.
        #[test]
        fn prop_fragmentation_preserves_payload(
            payload in proptest::collection::vec(any::<u8>(), 1..600),
            max_write in 1usize..64,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("runtime");

            rt.block_on(async {
                let (transport, mut peer) = transport_pair(max_write);

                let exchange = tokio::spawn({
                    let transport = Arc::clone(&transport);
                    let payload = payload.clone();
                    async move { transport.send_request(&payload).await }
                });

                let mut reassembled = Vec::new();
                while reassembled.len() < payload.len() {
                    let chunk = peer.next_chunk().await.expect("chunk");
                    prop_assert!(chunk.len() <= max_write);
                    prop_assert!(!chunk.is_empty());
                    reassembled.extend_from_slice(&chunk);
                }
                prop_assert_eq!(&reassembled, &payload);

                peer.respond(&json!({"Result": "Success"}));
                let response = exchange.await.expect("join").expect("response");
                prop_assert_eq!(response["Result"].as_str(), Some("Success"));
                Ok(())
            })?;
        }
    }
}

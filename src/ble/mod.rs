//! BLE link layer.
//!
//! This module defines the seam between the transport engine and the
//! physical BLE stack. The engine consumes a [`GattLink`]: a capability to
//! write byte chunks to a characteristic with acknowledgment and to
//! receive inbound bytes and disconnect notice as [`LinkEvent`]s.
//!
//! Two implementations are provided:
//!
//! | Implementation | Purpose |
//! |----------------|---------|
//! | [`central::FanLink`] | btleplug-backed link to a real fan controller |
//! | [`simulated::SimulatedLink`] | in-process channel-backed link for tests |
//!
//! # GATT Layout
//!
//! The fan controller exposes a single service with one characteristic
//! used for both acknowledged writes and notifications:
//!
//! | Item | UUID |
//! |------|------|
//! | Fan service | `000000ff-0000-1000-8000-00805f9b34fb` |
//! | Data characteristic (write + notify) | `0000ff01-0000-1000-8000-00805f9b34fb` |

// ============================================================================
// Submodules
// ============================================================================

/// btleplug-backed discovery and link to a real fan controller.
pub mod central;

/// Channel-backed link for testing without radio hardware.
pub mod simulated;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// UUID of the fan controller's GATT service.
pub const FAN_SERVICE_UUID: Uuid = Uuid::from_u128(0x000000ff_0000_1000_8000_00805f9b34fb);

/// UUID of the data characteristic (acknowledged write + notify).
pub const FAN_DATA_UUID: Uuid = Uuid::from_u128(0x0000ff01_0000_1000_8000_00805f9b34fb);

/// Advertised name prefix fan controllers use.
pub const FAN_NAME_PREFIX: &str = "ATTICFAN";

// ============================================================================
// LinkEvent
// ============================================================================

/// An inbound event from the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// One notification payload, delivered in send order.
    Notification(Vec<u8>),
    /// The peer dropped the connection.
    Disconnected,
}

// ============================================================================
// GattLink
// ============================================================================

/// An established, notification-subscribed link to one peripheral.
///
/// Implementations guarantee that [`LinkEvent::Notification`]s are
/// delivered in the order the peer sent them and that exactly one
/// [`LinkEvent::Disconnected`] terminates the event stream when the peer
/// drops the link.
#[async_trait]
pub trait GattLink: Send + Sync {
    /// Name the peripheral advertised during discovery.
    fn peer_name(&self) -> &str;

    /// Maximum payload size for a single acknowledged write.
    fn max_write_size(&self) -> usize;

    /// Writes one chunk and waits for link-level acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns a BLE stack error if the write is not acknowledged.
    async fn write_chunk(&self, chunk: &[u8]) -> Result<()>;

    /// Takes the inbound event stream.
    ///
    /// Called exactly once by the transport at startup; returns `None` on
    /// later calls.
    fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<LinkEvent>>;

    /// Tears down the physical connection.
    ///
    /// # Errors
    ///
    /// Returns a BLE stack error if the disconnect request fails.
    async fn close(&self) -> Result<()>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuids_match_wire_layout() {
        assert_eq!(
            FAN_SERVICE_UUID.to_string(),
            "000000ff-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            FAN_DATA_UUID.to_string(),
            "0000ff01-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn test_link_event_equality() {
        let a = LinkEvent::Notification(vec![1, 2, 3]);
        let b = LinkEvent::Notification(vec![1, 2, 3]);
        assert_eq!(a, b);
        assert_ne!(a, LinkEvent::Disconnected);
    }
}

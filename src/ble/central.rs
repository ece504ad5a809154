//! btleplug-backed discovery and link to a real fan controller.
//!
//! Bring-up sequence:
//!
//! 1. Scan for a peripheral whose advertised name starts with the
//!    configured prefix, within a bounded timeout.
//! 2. Connect and enumerate GATT services.
//! 3. Resolve the data characteristic on the fan service and subscribe
//!    to notifications.
//! 4. Spawn a forwarder task that turns notifications and the adapter's
//!    disconnect event into [`LinkEvent`]s.
//!
//! btleplug does not surface the negotiated ATT MTU, so the per-write
//! payload limit comes from [`ClientConfig::chunk_size`] (default 20
//! bytes, the minimum ATT MTU of 23 minus the 3-byte header).

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use btleplug::api::{
    Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};

use super::{FAN_DATA_UUID, FAN_SERVICE_UUID, GattLink, LinkEvent};

// ============================================================================
// FanLink
// ============================================================================

/// A connected, notification-subscribed link to one fan controller.
pub struct FanLink {
    /// The connected peripheral.
    peripheral: Peripheral,
    /// The data characteristic (acknowledged write + notify).
    characteristic: Characteristic,
    /// Name the fan advertised during discovery.
    peer_name: String,
    /// Per-write payload limit.
    max_write: usize,
    /// Inbound events, handed to the transport once.
    events_rx: Option<mpsc::UnboundedReceiver<LinkEvent>>,
}

impl FanLink {
    /// Discovers a fan and brings the link up.
    ///
    /// # Errors
    ///
    /// - [`Error::NoAdapter`] if the host has no Bluetooth adapter
    /// - [`Error::DiscoveryTimeout`] if no matching fan advertises in time
    /// - [`Error::ServiceNotFound`] / [`Error::CharacteristicNotFound`] if
    ///   the peripheral lacks the expected GATT layout
    /// - [`Error::Ble`] for stack-level failures
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NoAdapter)?;

        let peripheral = discover_fan(&adapter, config).await?;
        let peer_name = peripheral
            .properties()
            .await?
            .and_then(|p| p.local_name)
            .unwrap_or_default();
        info!(fan = %peer_name, "Connecting");

        peripheral.connect().await?;
        peripheral.discover_services().await?;

        let characteristic = resolve_characteristic(&peripheral)?;
        peripheral.subscribe(&characteristic).await?;
        debug!(characteristic = %characteristic.uuid, "Subscribed to notifications");

        let events_rx = spawn_event_forwarder(&adapter, &peripheral).await?;

        Ok(Self {
            peripheral,
            characteristic,
            peer_name,
            max_write: config.chunk_size,
            events_rx: Some(events_rx),
        })
    }
}

#[async_trait]
impl GattLink for FanLink {
    fn peer_name(&self) -> &str {
        &self.peer_name
    }

    fn max_write_size(&self) -> usize {
        self.max_write
    }

    async fn write_chunk(&self, chunk: &[u8]) -> Result<()> {
        self.peripheral
            .write(&self.characteristic, chunk, WriteType::WithResponse)
            .await?;
        trace!(len = chunk.len(), "Chunk acknowledged");
        Ok(())
    }

    fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<LinkEvent>> {
        self.events_rx.take()
    }

    async fn close(&self) -> Result<()> {
        self.peripheral.disconnect().await?;
        Ok(())
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// Scans until a peripheral matching the name prefix appears, bounded by
/// the configured discovery timeout.
async fn discover_fan(adapter: &Adapter, config: &ClientConfig) -> Result<Peripheral> {
    let mut events = adapter.events().await?;
    adapter.start_scan(ScanFilter::default()).await?;
    debug!(prefix = %config.name_prefix, "Scanning");

    let found = timeout(config.discovery_timeout, async {
        // Devices seen before this scan started are candidates too.
        for peripheral in adapter.peripherals().await? {
            if advertises_prefix(&peripheral, &config.name_prefix).await {
                return Ok(peripheral);
            }
        }

        while let Some(event) = events.next().await {
            let id = match event {
                CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                _ => continue,
            };
            let peripheral = adapter.peripheral(&id).await?;
            if advertises_prefix(&peripheral, &config.name_prefix).await {
                return Ok(peripheral);
            }
        }

        Err(Error::connection("adapter event stream ended during scan"))
    })
    .await;

    adapter.stop_scan().await?;

    match found {
        Ok(result) => result,
        Err(_) => Err(Error::discovery_timeout(
            config.discovery_timeout.as_millis() as u64,
        )),
    }
}

/// Returns `true` if the peripheral's advertised name starts with `prefix`.
async fn advertises_prefix(peripheral: &Peripheral, prefix: &str) -> bool {
    match peripheral.properties().await {
        Ok(Some(props)) => props
            .local_name
            .as_deref()
            .is_some_and(|name| name.starts_with(prefix)),
        Ok(None) => false,
        Err(e) => {
            trace!(error = %e, "Skipping peripheral with unreadable properties");
            false
        }
    }
}

// ============================================================================
// GATT Resolution
// ============================================================================

/// Finds the data characteristic on the fan service.
fn resolve_characteristic(peripheral: &Peripheral) -> Result<Characteristic> {
    let service = peripheral
        .services()
        .into_iter()
        .find(|s| s.uuid == FAN_SERVICE_UUID)
        .ok_or_else(|| Error::service_not_found(FAN_SERVICE_UUID))?;

    service
        .characteristics
        .into_iter()
        .find(|c| c.uuid == FAN_DATA_UUID)
        .ok_or_else(|| Error::characteristic_not_found(FAN_DATA_UUID))
}

// ============================================================================
// Event Forwarding
// ============================================================================

/// Spawns the task that merges notifications and the adapter's disconnect
/// event into one ordered [`LinkEvent`] stream.
async fn spawn_event_forwarder(
    adapter: &Adapter,
    peripheral: &Peripheral,
) -> Result<mpsc::UnboundedReceiver<LinkEvent>> {
    let mut notifications = peripheral.notifications().await?;
    let mut central_events = adapter.events().await?;
    let peripheral_id = peripheral.id();
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                notification = notifications.next() => match notification {
                    Some(n) if n.uuid == FAN_DATA_UUID => {
                        if events_tx.send(LinkEvent::Notification(n.value)).is_err() {
                            break;
                        }
                    }
                    Some(n) => {
                        warn!(uuid = %n.uuid, "Notification from unexpected characteristic");
                    }
                    None => {
                        let _ = events_tx.send(LinkEvent::Disconnected);
                        break;
                    }
                },

                event = central_events.next() => match event {
                    Some(CentralEvent::DeviceDisconnected(id)) if id == peripheral_id => {
                        debug!("Peer disconnected");
                        let _ = events_tx.send(LinkEvent::Disconnected);
                        break;
                    }
                    Some(_) => {}
                    None => {
                        let _ = events_tx.send(LinkEvent::Disconnected);
                        break;
                    }
                },
            }
        }
    });

    Ok(events_rx)
}

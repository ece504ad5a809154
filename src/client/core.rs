//! Client coordinator and factory.
//!
//! [`Client`] holds validated configuration and performs the full
//! bring-up on demand: discovery, link establishment, transport wiring,
//! and session creation.

// ============================================================================
// Imports
// ============================================================================

use tracing::info;

use crate::api::Api;
use crate::ble::central::FanLink;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::session::Session;
use crate::transport::Transport;

use super::builder::ClientBuilder;

// ============================================================================
// Client
// ============================================================================

/// Entry point for talking to a fan.
///
/// A client is configuration, not a connection: each
/// [`connect`](Client::connect) performs a fresh discovery and bring-up
/// and yields an independent [`Api`]. After a peer disconnect the old
/// `Api` is unusable; connect again for a new one.
///
/// # Examples
///
/// ```no_run
/// use quietcool::Client;
///
/// # async fn example() -> quietcool::Result<()> {
/// let client = Client::builder().pair_id("aa4a737ffd756c6d").build()?;
/// let api = client.connect().await?;
/// let info = api.fan_info().await?;
/// println!("{} ({})", info.name, info.model);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    /// Validated configuration.
    config: ClientConfig,
}

impl Client {
    /// Creates a client from validated configuration.
    #[must_use]
    pub(crate) fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Creates a builder for configuring a client.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The configuration this client connects with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Discovers a fan, brings the link up, and returns the typed API.
    ///
    /// Login is performed lazily by the first command; call
    /// [`Api::login`] to authenticate eagerly.
    ///
    /// # Errors
    ///
    /// Any discovery, connection, or GATT-resolution error; see
    /// [`FanLink::connect`].
    pub async fn connect(&self) -> Result<Api> {
        let link = FanLink::connect(&self.config).await?;
        let transport = Transport::new(link)?;
        info!(fan = %transport.peer_name(), "Connected");

        let session = Session::new(transport, self.config.pair_id.clone());
        Ok(Api::new(session))
    }
}

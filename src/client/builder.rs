//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`Client`]
//! instances.
//!
//! # Example
//!
//! ```no_run
//! use quietcool::Client;
//!
//! # fn example() -> quietcool::Result<()> {
//! let client = Client::builder()
//!     .pair_id("aa4a737ffd756c6d")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::config::{self, ClientConfig};
use crate::error::{Error, Result};

use super::core::Client;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`] instance.
///
/// Use [`Client::builder()`] to create a new builder. Every field is
/// optional: the pairing identifier falls back to the sourcing chain
/// (environment variable, well-known files) and the rest to defaults.
#[derive(Debug, Default, Clone)]
pub struct ClientBuilder {
    /// Explicit pairing identifier.
    pair_id: Option<String>,
    /// Advertised name prefix to discover by.
    name_prefix: Option<String>,
    /// Discovery scan timeout.
    discovery_timeout: Option<Duration>,
    /// Per-write payload limit.
    chunk_size: Option<usize>,
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new client builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pairing identifier explicitly.
    ///
    /// When not set, the identifier is sourced from the `QUIETCOOL`
    /// environment variable or the well-known files at build time.
    #[inline]
    #[must_use]
    pub fn pair_id(mut self, pair_id: impl Into<String>) -> Self {
        self.pair_id = Some(pair_id.into());
        self
    }

    /// Overrides the advertised name prefix used during discovery.
    #[inline]
    #[must_use]
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    /// Overrides how long discovery may scan before giving up.
    #[inline]
    #[must_use]
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = Some(timeout);
        self
    }

    /// Overrides the per-write payload limit.
    ///
    /// Useful when the link negotiates a larger ATT MTU than the
    /// conservative default assumes.
    #[inline]
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Builds the client with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::PairIdNotFound`] if no pairing identifier could be
    ///   sourced
    /// - [`Error::Config`] if an override is invalid
    pub fn build(self) -> Result<Client> {
        let pair_id = config::resolve_pair_id(self.pair_id.as_deref())?;

        if self.chunk_size == Some(0) {
            return Err(Error::config("chunk size must be at least 1 byte"));
        }

        let mut config = ClientConfig::new(pair_id);
        if let Some(prefix) = self.name_prefix {
            config.name_prefix = prefix;
        }
        if let Some(timeout) = self.discovery_timeout {
            config.discovery_timeout = timeout;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }

        Ok(Client::new(config))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ClientBuilder::new();
        assert!(builder.pair_id.is_none());
        assert!(builder.name_prefix.is_none());
        assert!(builder.discovery_timeout.is_none());
        assert!(builder.chunk_size.is_none());
    }

    #[test]
    fn test_build_with_explicit_pair_id() {
        let client = ClientBuilder::new()
            .pair_id("aa4a737ffd756c6d")
            .build()
            .expect("build");

        assert_eq!(client.config().pair_id, "aa4a737ffd756c6d");
        assert_eq!(client.config().name_prefix, "ATTICFAN");
    }

    #[test]
    fn test_overrides_apply() {
        let client = ClientBuilder::new()
            .pair_id("aa4a737ffd756c6d")
            .name_prefix("GABLEFAN")
            .discovery_timeout(Duration::from_secs(10))
            .chunk_size(180)
            .build()
            .expect("build");

        assert_eq!(client.config().name_prefix, "GABLEFAN");
        assert_eq!(client.config().discovery_timeout, Duration::from_secs(10));
        assert_eq!(client.config().chunk_size, 180);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let result = ClientBuilder::new()
            .pair_id("aa4a737ffd756c6d")
            .chunk_size(0)
            .build();

        let err = result.expect_err("must reject");
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_builder_is_clone() {
        let builder = ClientBuilder::new().pair_id("aa4a737ffd756c6d");
        let cloned = builder.clone();
        assert_eq!(builder.pair_id, cloned.pair_id);
    }
}

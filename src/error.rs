//! Error types for the QuietCool client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use quietcool::{Result, Error};
//!
//! async fn example(api: &Api) -> Result<()> {
//!     let info = api.fan_info().await?;
//!     println!("{}", info.name);
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::PairIdNotFound`] |
//! | Discovery | [`Error::NoAdapter`], [`Error::DiscoveryTimeout`] |
//! | Connection | [`Error::Connection`], [`Error::ServiceNotFound`], [`Error::CharacteristicNotFound`] |
//! | Transport | [`Error::NotConnected`], [`Error::Disconnected`], [`Error::RequestInFlight`], [`Error::MalformedFrame`] |
//! | Session | [`Error::Authentication`], [`Error::PairIdNotFound`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::Ble`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Discovery Errors
    // ========================================================================
    /// No Bluetooth adapter available on this host.
    ///
    /// Returned when the BLE stack reports zero usable adapters.
    #[error("No Bluetooth adapter found")]
    NoAdapter,

    /// Discovery produced no candidate peripheral within the timeout.
    ///
    /// Returned when no advertising device matched the name prefix.
    #[error("No fan discovered within {timeout_ms}ms")]
    DiscoveryTimeout {
        /// Milliseconds scanned before giving up.
        timeout_ms: u64,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Link bring-up failed.
    ///
    /// Returned when the physical connection cannot be established.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Expected GATT service is absent on the peripheral.
    #[error("Service not found: {uuid}")]
    ServiceNotFound {
        /// UUID of the missing service.
        uuid: Uuid,
    },

    /// Expected GATT characteristic is absent on the peripheral.
    #[error("Characteristic not found: {uuid}")]
    CharacteristicNotFound {
        /// UUID of the missing characteristic.
        uuid: Uuid,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// Operation attempted on a transport that is not connected.
    ///
    /// Returned when the transport never connected or already tore down.
    /// This is a caller error, surfaced immediately.
    #[error("Not connected")]
    NotConnected,

    /// Peer dropped the link while a request was outstanding.
    ///
    /// The transport instance is unusable after this error.
    #[error("Peer disconnected")]
    Disconnected,

    /// A request was issued while another was still outstanding.
    ///
    /// The protocol carries no request identifiers, so only one exchange
    /// may be in flight at a time. Callers must await the current
    /// response before sending again.
    #[error("A request is already in flight")]
    RequestInFlight,

    /// Inbound reassembly exceeded the maximum buffered size without
    /// producing a complete frame.
    ///
    /// Returned when the peer streams bytes that never parse as one JSON
    /// value. The buffer is reset and the in-flight request fails.
    #[error("Malformed frame: {buffered} bytes buffered without a complete message")]
    MalformedFrame {
        /// Bytes accumulated when the limit was hit.
        buffered: usize,
    },

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// Login response did not indicate success.
    ///
    /// Carries the raw response for diagnostics. The caller decides
    /// whether to retry with the same or a different pairing identifier.
    #[error("Authentication failed: {response}")]
    Authentication {
        /// The raw login response.
        response: Value,
    },

    /// No pairing identifier could be sourced.
    ///
    /// Returned when neither an explicit value, the `QUIETCOOL`
    /// environment variable, nor any of the well-known files provided one.
    #[error(
        "No pairing identifier found. Set the QUIETCOOL environment variable \
         or create /etc/quietcool, ~/.quietcool, or ./.quietcool"
    )]
    PairIdNotFound,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// BLE stack error.
    #[error("BLE error: {0}")]
    Ble(#[from] btleplug::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a discovery timeout error.
    #[inline]
    pub fn discovery_timeout(timeout_ms: u64) -> Self {
        Self::DiscoveryTimeout { timeout_ms }
    }

    /// Creates a service not found error.
    #[inline]
    pub fn service_not_found(uuid: Uuid) -> Self {
        Self::ServiceNotFound { uuid }
    }

    /// Creates a characteristic not found error.
    #[inline]
    pub fn characteristic_not_found(uuid: Uuid) -> Self {
        Self::CharacteristicNotFound { uuid }
    }

    /// Creates a malformed frame error.
    #[inline]
    pub fn malformed_frame(buffered: usize) -> Self {
        Self::MalformedFrame { buffered }
    }

    /// Creates an authentication error carrying the raw response.
    #[inline]
    pub fn authentication(response: Value) -> Self {
        Self::Authentication { response }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection-related error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::NoAdapter
                | Self::DiscoveryTimeout { .. }
                | Self::Connection { .. }
                | Self::ServiceNotFound { .. }
                | Self::CharacteristicNotFound { .. }
                | Self::Ble(_)
        )
    }

    /// Returns `true` if the transport is unusable after this error.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NotConnected | Self::Disconnected)
    }

    /// Returns `true` if this error may succeed on retry.
    ///
    /// A failed login leaves the session unauthenticated; retrying resends
    /// the same request. Discovery timeouts are transient by nature.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DiscoveryTimeout { .. } | Self::Authentication { .. } | Self::RequestInFlight
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    use serde_json::json;

    #[test]
    fn test_error_display() {
        let err = Error::connection("link dropped during bring-up");
        assert_eq!(
            err.to_string(),
            "Connection failed: link dropped during bring-up"
        );
    }

    #[test]
    fn test_discovery_timeout_display() {
        let err = Error::discovery_timeout(3000);
        assert_eq!(err.to_string(), "No fan discovered within 3000ms");
    }

    #[test]
    fn test_authentication_carries_response() {
        let err = Error::authentication(json!({"Result": "Fail"}));
        assert!(err.to_string().contains("Fail"));
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::NoAdapter.is_connection_error());
        assert!(Error::discovery_timeout(3000).is_connection_error());
        assert!(Error::connection("x").is_connection_error());
        assert!(!Error::NotConnected.is_connection_error());
        assert!(!Error::RequestInFlight.is_connection_error());
    }

    #[test]
    fn test_is_terminal() {
        assert!(Error::NotConnected.is_terminal());
        assert!(Error::Disconnected.is_terminal());
        assert!(!Error::RequestInFlight.is_terminal());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::authentication(json!({"Result": "Fail"})).is_recoverable());
        assert!(Error::RequestInFlight.is_recoverable());
        assert!(!Error::Disconnected.is_recoverable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}

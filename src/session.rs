//! Login gating atop one transport connection.
//!
//! The fan controller ignores every command until the client has logged
//! in with a pairing identifier the fan recognizes. [`Session`] performs
//! that login lazily on first use and gates every command behind it.
//!
//! # State Machine
//!
//! ```text
//! Unauthenticated --(login response "Success")--> Authenticated
//! ```
//!
//! `Authenticated` is terminal for the life of the underlying
//! connection; there is no logout. A peer disconnect invalidates the
//! transport beneath the session, not this flag — a session must not be
//! reused after disconnect.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::protocol::{Request, Response};
use crate::transport::Transport;

// ============================================================================
// Session
// ============================================================================

/// The authenticated-or-not state layered atop one [`Transport`].
pub struct Session {
    /// The connection this session authenticates.
    transport: Transport,
    /// Pairing identifier presented at login.
    pair_id: String,
    /// Transitions false→true exactly once per connection lifetime.
    logged_in: AtomicBool,
}

impl Session {
    /// Creates an unauthenticated session over an established transport.
    #[must_use]
    pub fn new(transport: Transport, pair_id: impl Into<String>) -> Self {
        Self {
            transport,
            pair_id: pair_id.into(),
            logged_in: AtomicBool::new(false),
        }
    }

    /// Returns `true` once a login has succeeded.
    #[inline]
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::Acquire)
    }

    /// The transport beneath this session.
    #[inline]
    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Logs in if not already authenticated.
    ///
    /// A no-op (no network exchange) when already logged in. A failed
    /// login leaves the session unauthenticated; retrying resends the
    /// same request, with no backoff — the caller decides whether to
    /// retry.
    ///
    /// # Errors
    ///
    /// - [`Error::Authentication`] if the fan rejects the pairing
    ///   identifier; the raw response is carried for diagnostics
    /// - Any transport error from the exchange
    pub async fn ensure_logged_in(&self) -> Result<()> {
        if self.is_logged_in() {
            return Ok(());
        }

        debug!("Logging in");
        let response = self.exchange(&Request::login(&self.pair_id)).await?;

        if response.is_success() {
            self.logged_in.store(true, Ordering::Release);
            info!("Logged in");
            Ok(())
        } else {
            Err(Error::authentication(response.into_value()))
        }
    }

    /// Sends a command, logging in first if necessary.
    ///
    /// Returns the decoded response unmodified for the typed layer to
    /// project into results.
    ///
    /// # Errors
    ///
    /// Any login or transport error.
    pub async fn call(&self, api: &str, params: Map<String, Value>) -> Result<Response> {
        self.ensure_logged_in().await?;
        self.exchange(&Request::with_params(api, params)).await
    }

    /// One raw request/response exchange, bypassing the login gate.
    async fn exchange(&self, request: &Request) -> Result<Response> {
        let value = self.transport.send_request(&request.to_bytes()?).await?;
        Ok(Response::from(value))
    }
}

// ============================================================================
// Tests
// ============================================================================

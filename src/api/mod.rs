//! Typed command wrappers.
//!
//! [`Api`] maps named fan operations onto protocol requests and projects
//! the raw responses into typed results. Every command is gated behind
//! the session's lazy login.
//!
//! | Method | Wire command |
//! |--------|--------------|
//! | [`Api::fan_info`] | `GetFanInfo` |
//! | [`Api::version`] | `GetVersion` |
//! | [`Api::parameters`] | `GetParameter` |
//! | [`Api::presets`] | `GetPresets` |
//! | [`Api::remain_time`] | `GetRemainTime` |
//! | [`Api::upgrade_state`] | `GetUpgradeState` |
//! | [`Api::work_state`] | `GetWorkState` |

// ============================================================================
// Submodules
// ============================================================================

/// Typed result structs.
pub mod types;

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use tracing::debug;

use crate::error::Result;
use crate::session::Session;

pub use types::{FanInfo, Parameters, Preset, RemainTime, UpgradeState, VersionInfo, WorkState};

// ============================================================================
// Api
// ============================================================================

/// Typed command surface over one authenticated session.
pub struct Api {
    /// The session every command goes through.
    session: Session,
}

impl Api {
    /// Wraps a session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// The session beneath this API.
    #[inline]
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Name the fan advertised during discovery.
    #[inline]
    #[must_use]
    pub fn peer_name(&self) -> &str {
        self.session.transport().peer_name()
    }

    /// Logs in now instead of lazily on the first command.
    ///
    /// # Errors
    ///
    /// See [`Session::ensure_logged_in`].
    pub async fn login(&self) -> Result<()> {
        self.session.ensure_logged_in().await
    }

    /// Fan identity.
    ///
    /// # Errors
    ///
    /// Any login, transport, or decode error.
    pub async fn fan_info(&self) -> Result<FanInfo> {
        self.fetch("GetFanInfo").await
    }

    /// Firmware and hardware versions.
    ///
    /// # Errors
    ///
    /// Any login, transport, or decode error.
    pub async fn version(&self) -> Result<VersionInfo> {
        self.fetch("GetVersion").await
    }

    /// Configured operating parameters.
    ///
    /// # Errors
    ///
    /// Any login, transport, or decode error.
    pub async fn parameters(&self) -> Result<Parameters> {
        self.fetch("GetParameter").await
    }

    /// Stored presets.
    ///
    /// # Errors
    ///
    /// Any login, transport, or decode error.
    pub async fn presets(&self) -> Result<Vec<Preset>> {
        let envelope: PresetsEnvelope = self.fetch("GetPresets").await?;
        Ok(envelope.presets)
    }

    /// Countdown timer remaining.
    ///
    /// # Errors
    ///
    /// Any login, transport, or decode error.
    pub async fn remain_time(&self) -> Result<RemainTime> {
        self.fetch("GetRemainTime").await
    }

    /// Firmware upgrade status.
    ///
    /// # Errors
    ///
    /// Any login, transport, or decode error.
    pub async fn upgrade_state(&self) -> Result<UpgradeState> {
        self.fetch("GetUpgradeState").await
    }

    /// Current operating state and sensor readings.
    ///
    /// # Errors
    ///
    /// Any login, transport, or decode error.
    pub async fn work_state(&self) -> Result<WorkState> {
        self.fetch("GetWorkState").await
    }

    /// Tears down the connection beneath the session.
    ///
    /// # Errors
    ///
    /// See [`Transport::disconnect`](crate::transport::Transport::disconnect).
    pub async fn disconnect(&self) -> Result<()> {
        self.session.transport().disconnect().await
    }

    /// One parameterless command, decoded into its result type.
    async fn fetch<T: DeserializeOwned>(&self, api: &str) -> Result<T> {
        let response = self.session.call(api, Map::new()).await?;
        debug!(command = api, response = %response.as_value(), "Response");
        Ok(serde_json::from_value(response.into_value())?)
    }
}

// ============================================================================
// PresetsEnvelope
// ============================================================================

/// `GetPresets` nests its list under a `Presets` key.
#[derive(Deserialize)]
struct PresetsEnvelope {
    #[serde(rename = "Presets")]
    presets: Vec<Preset>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use serde_json::json;

    use crate::ble::simulated::{SimulatedLink, SimulatedPeer};
    use crate::transport::Transport;

    /// An API over a simulated link with the login already scripted.
    async fn logged_in_api(max_write: usize) -> (Arc<Api>, SimulatedPeer) {
        let (link, mut peer) = SimulatedLink::pair("ATTICFAN-TEST", max_write);
        let transport = Transport::new(link).expect("transport");
        let api = Arc::new(Api::new(Session::new(transport, "aa4a737ffd756c6d")));

        let login = tokio::spawn({
            let api = Arc::clone(&api);
            async move { api.login().await }
        });
        peer.recv_request().await.expect("login request");
        peer.respond(&json!({"Result": "Success"}));
        login.await.expect("join").expect("login");

        (api, peer)
    }

    #[tokio::test]
    async fn test_fan_info() {
        let (api, mut peer) = logged_in_api(64).await;

        let call = tokio::spawn({
            let api = Arc::clone(&api);
            async move { api.fan_info().await }
        });

        let request = peer.recv_request().await.expect("request");
        assert_eq!(request, json!({"Api": "GetFanInfo"}));
        peer.respond(&json!({
            "Result": "Success",
            "Name": "ATTICFAN-1234",
            "Model": "Trident Pro",
            "SerialNum": "QC0001",
        }));

        let info = call.await.expect("join").expect("fan info");
        assert_eq!(info.name, "ATTICFAN-1234");
        assert_eq!(info.serial_num, "QC0001");
    }

    #[tokio::test]
    async fn test_presets_unwraps_envelope() {
        let (api, mut peer) = logged_in_api(64).await;

        let call = tokio::spawn({
            let api = Arc::clone(&api);
            async move { api.presets().await }
        });

        let request = peer.recv_request().await.expect("request");
        assert_eq!(request["Api"], "GetPresets");
        peer.respond(&json!({
            "Result": "Success",
            "Presets": [
                ["Summer", 35, 30, 25, 60, 80, "High"],
                ["Winter", 20, 15, 10, 50, 70, "Low"],
            ],
        }));

        let presets = call.await.expect("join").expect("presets");
        assert_eq!(presets.len(), 2);
        assert_eq!(presets[0].name, "Summer");
        assert_eq!(presets[1].humidity_speed, "Low");
    }

    #[tokio::test]
    async fn test_work_state_multi_chunk_response() {
        let (api, mut peer) = logged_in_api(64).await;

        let call = tokio::spawn({
            let api = Arc::clone(&api);
            async move { api.work_state().await }
        });

        peer.recv_request().await.expect("request");
        let response = json!({
            "Result": "Success",
            "Mode": "Running",
            "Range": "Temp",
            "SensorState": "Normal",
            "Temp_Sample": 312,
            "Humidity_Sample": 55,
        });
        peer.notify_chunked(response.to_string().as_bytes(), 10);

        let state = call.await.expect("join").expect("work state");
        assert_eq!(state.mode, "Running");
        assert_eq!(state.temperature, 31.2);
    }
}

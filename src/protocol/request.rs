//! Request and Response message types.
//!
//! Defines the JSON message format exchanged with the fan controller.
//!
//! # Format
//!
//! Every request is an object carrying the command name under `Api` plus
//! command parameters as sibling fields:
//!
//! ```json
//! {"Api": "Login", "PhoneID": "aa4a737ffd756c6d"}
//! ```
//!
//! Every response is an object carrying at minimum a `Result` status
//! field plus command-specific fields:
//!
//! ```json
//! {"Result": "Success"}
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// Command name of the login handshake.
pub const API_LOGIN: &str = "Login";

/// Parameter carrying the pairing identifier during login.
pub const PARAM_PHONE_ID: &str = "PhoneID";

/// Status field present in every response.
pub const RESULT_KEY: &str = "Result";

/// Status sentinel indicating success.
pub const RESULT_SUCCESS: &str = "Success";

// ============================================================================
// Request
// ============================================================================

/// A command request to the fan controller.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Command name.
    #[serde(rename = "Api")]
    pub api: String,

    /// Named parameters, serialized as sibling fields of `Api`.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl Request {
    /// Creates a parameterless request.
    #[inline]
    #[must_use]
    pub fn new(api: impl Into<String>) -> Self {
        Self {
            api: api.into(),
            params: Map::new(),
        }
    }

    /// Creates a request with named parameters.
    #[inline]
    #[must_use]
    pub fn with_params(api: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            api: api.into(),
            params,
        }
    }

    /// Creates the login handshake request.
    #[must_use]
    pub fn login(pair_id: &str) -> Self {
        let mut params = Map::new();
        params.insert(PARAM_PHONE_ID.to_string(), Value::String(pair_id.to_string()));
        Self::with_params(API_LOGIN, params)
    }

    /// Serializes the request to its wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

// ============================================================================
// Response
// ============================================================================

/// A decoded response frame.
///
/// Responses are returned unmodified; the typed API layer projects them
/// into result structs. The helpers here cover the status field and
/// ad-hoc field access.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Response(Value);

impl Response {
    /// The `Result` status field, if present and a string.
    #[inline]
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.0.get(RESULT_KEY).and_then(Value::as_str)
    }

    /// Returns `true` if the status field equals the success sentinel.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result() == Some(RESULT_SUCCESS)
    }

    /// Gets a field by key.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Gets a string field by key.
    #[inline]
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Gets an integer field by key.
    #[inline]
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Borrows the raw JSON value.
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the response, yielding the raw JSON value.
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Response {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_login_request_wire_format() {
        let request = Request::login("aa4a737ffd756c6d");
        let wire: Value = serde_json::from_slice(&request.to_bytes().expect("bytes")).expect("json");

        assert_eq!(
            wire,
            json!({"Api": "Login", "PhoneID": "aa4a737ffd756c6d"})
        );
    }

    #[test]
    fn test_parameterless_request_has_only_api() {
        let request = Request::new("GetFanInfo");
        let wire: Value = serde_json::from_slice(&request.to_bytes().expect("bytes")).expect("json");

        assert_eq!(wire, json!({"Api": "GetFanInfo"}));
    }

    #[test]
    fn test_params_flatten_beside_api() {
        let mut params = Map::new();
        params.insert("Hour".to_string(), json!(2));
        let request = Request::with_params("SetRemainTime", params);
        let wire: Value = serde_json::from_slice(&request.to_bytes().expect("bytes")).expect("json");

        assert_eq!(wire, json!({"Api": "SetRemainTime", "Hour": 2}));
    }

    #[test]
    fn test_success_response() {
        let response = Response::from(json!({"Result": "Success"}));
        assert!(response.is_success());
        assert_eq!(response.result(), Some("Success"));
    }

    #[test]
    fn test_failure_response() {
        let response = Response::from(json!({"Result": "Fail"}));
        assert!(!response.is_success());
        assert_eq!(response.result(), Some("Fail"));
    }

    #[test]
    fn test_missing_result_is_not_success() {
        let response = Response::from(json!({"State": "Idle"}));
        assert!(!response.is_success());
        assert_eq!(response.result(), None);
    }

    #[test]
    fn test_field_getters() {
        let response = Response::from(json!({
            "Result": "Success",
            "Name": "ATTICFAN-1234",
            "GetTemp_H": 35,
        }));

        assert_eq!(response.get_str("Name"), Some("ATTICFAN-1234"));
        assert_eq!(response.get_i64("GetTemp_H"), Some(35));
        assert_eq!(response.get_str("Missing"), None);
    }
}

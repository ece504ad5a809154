//! Wire protocol message types.
//!
//! Each logical message is one JSON value serialized to UTF-8 bytes and
//! split into link-sized chunks with no additional framing; the
//! receiver's incremental parse is the de facto delimiter.
//!
//! | Message | Direction | Shape |
//! |---------|-----------|-------|
//! | [`Request`] | client → fan | `{"Api": <command>, ...params}` |
//! | [`Response`] | fan → client | `{"Result": <status>, ...fields}` |

// ============================================================================
// Submodules
// ============================================================================

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use request::{API_LOGIN, PARAM_PHONE_ID, RESULT_KEY, RESULT_SUCCESS, Request, Response};

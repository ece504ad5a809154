//! QuietCool - BLE client for smart attic fan controllers.
//!
//! This library speaks the fan controller's JSON-over-GATT protocol:
//! each command is one JSON object written to a characteristic in
//! link-sized chunks, and each response streams back as notification
//! chunks reassembled by incremental parsing.
//!
//! # Architecture
//!
//! Two strictly layered components carry the protocol:
//!
//! - **Transport**: connection lifecycle, outbound fragmentation,
//!   inbound frame reassembly, one-request/one-response discipline
//! - **Session**: lazy login gating every command behind a successful
//!   pairing-identifier handshake
//!
//! Control flow: caller → [`Api`] → [`Session::call`] → (ensure logged
//! in → [`Transport::send_request`]) → chunked acknowledged writes →
//! notification chunks → one reassembled JSON frame → typed result.
//!
//! # Quick Start
//!
//! ```no_run
//! use quietcool::{Client, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // The pairing identifier may also come from the QUIETCOOL
//!     // environment variable or a well-known file.
//!     let client = Client::builder().pair_id("aa4a737ffd756c6d").build()?;
//!
//!     let api = client.connect().await?;
//!     let info = api.fan_info().await?;
//!     println!("{} ({})", info.name, info.model);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Typed command wrappers and result structs |
//! | [`ble`] | Link seam: [`GattLink`](ble::GattLink), btleplug central, simulated link |
//! | [`client`] | [`Client`] / [`ClientBuilder`] factory |
//! | [`config`] | Configuration and pairing-identifier sourcing |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`protocol`] | Wire message types |
//! | [`session`] | Login gating |
//! | [`transport`] | Fragmentation, reassembly, request/response engine |

// ============================================================================
// Modules
// ============================================================================

/// Typed command wrappers and result structs.
pub mod api;

/// BLE link layer: the `GattLink` seam and its implementations.
pub mod ble;

/// Client factory and configuration builder.
pub mod client;

/// Configuration and pairing-identifier sourcing.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Wire protocol message types.
pub mod protocol;

/// Login gating atop one transport connection.
pub mod session;

/// Transport layer: fragmentation, reassembly, request/response engine.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// API types
pub use api::{Api, FanInfo, Parameters, Preset, RemainTime, UpgradeState, VersionInfo, WorkState};

// Client types
pub use client::{Client, ClientBuilder};

// Configuration
pub use config::ClientConfig;

// Error types
pub use error::{Error, Result};

// Protocol types
pub use protocol::{Request, Response};

// Core engine types
pub use session::Session;
pub use transport::Transport;

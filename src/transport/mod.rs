//! Transport layer: request/response exchange over a chunked BLE link.
//!
//! The fan controller speaks JSON over GATT with nothing but the JSON
//! grammar for framing. Outbound messages are fragmented to the link's
//! per-write limit; inbound notification chunks are reassembled by
//! re-parsing the accumulated buffer after every chunk.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `assembly` | Inbound frame reassembly buffer |
//! | `connection` | The [`Transport`] engine and its event loop |

// ============================================================================
// Submodules
// ============================================================================

/// Inbound frame reassembly.
pub mod assembly;

/// The transport engine.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use assembly::{AssemblyBuffer, MAX_ASSEMBLY_BYTES};
pub use connection::Transport;

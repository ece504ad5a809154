//! Client factory and configuration.
//!
//! Use [`Client::builder()`] to create a configured client, then
//! [`Client::connect()`] to discover a fan and obtain its typed API.

// ============================================================================
// Submodules
// ============================================================================

/// Builder pattern for client configuration.
pub mod builder;

/// Client coordinator and factory.
pub mod core;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use core::Client;

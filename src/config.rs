//! Client configuration and pairing-identifier sourcing.
//!
//! The fan controller only answers commands after a login carrying a
//! pairing identifier it has previously been paired with. When no
//! identifier is given explicitly, it is sourced in this order:
//!
//! 1. `QUIETCOOL` environment variable
//! 2. `/etc/quietcool`
//! 3. `~/.quietcool`
//! 4. `./.quietcool`
//!
//! File contents are trimmed; blank files are skipped.

// ============================================================================
// Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::ble::FAN_NAME_PREFIX;
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Environment variable consulted for the pairing identifier.
pub const PAIR_ID_ENV: &str = "QUIETCOOL";

/// System-wide pairing identifier file.
const PAIR_ID_SYSTEM_FILE: &str = "/etc/quietcool";

/// Pairing identifier file name under the home and working directories.
const PAIR_ID_DOTFILE: &str = ".quietcool";

/// Default discovery timeout.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Default per-write payload size.
///
/// The minimum ATT MTU is 23 bytes, 3 of which are protocol header.
pub const DEFAULT_CHUNK_SIZE: usize = 20;

// ============================================================================
// ClientConfig
// ============================================================================

/// Validated configuration for one client instance.
///
/// Built by [`ClientBuilder`](crate::client::ClientBuilder).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Pairing identifier presented at login.
    pub pair_id: String,
    /// Advertised name prefix to discover by.
    pub name_prefix: String,
    /// How long discovery may scan before giving up.
    pub discovery_timeout: Duration,
    /// Per-write payload limit for outbound fragmentation.
    pub chunk_size: usize,
}

impl ClientConfig {
    /// Creates a config with defaults and the given pairing identifier.
    #[must_use]
    pub fn new(pair_id: impl Into<String>) -> Self {
        Self {
            pair_id: pair_id.into(),
            name_prefix: FAN_NAME_PREFIX.to_string(),
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

// ============================================================================
// Pairing Identifier Sourcing
// ============================================================================

/// Resolves the pairing identifier from the explicit value or the
/// well-known sources, in order.
///
/// # Errors
///
/// Returns [`Error::PairIdNotFound`] if no source yields a non-blank value.
pub fn resolve_pair_id(explicit: Option<&str>) -> Result<String> {
    if let Some(id) = explicit.map(str::trim).filter(|id| !id.is_empty()) {
        return Ok(id.to_string());
    }

    if let Ok(id) = env::var(PAIR_ID_ENV) {
        let id = id.trim();
        if !id.is_empty() {
            debug!(source = PAIR_ID_ENV, "Pairing identifier from environment");
            return Ok(id.to_string());
        }
    }

    for path in candidate_files() {
        if let Some(id) = read_pair_id_file(&path) {
            debug!(source = %path.display(), "Pairing identifier from file");
            return Ok(id);
        }
    }

    Err(Error::PairIdNotFound)
}

/// The pairing identifier files, in lookup order.
fn candidate_files() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(PAIR_ID_SYSTEM_FILE)];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(PAIR_ID_DOTFILE));
    }
    paths.push(PathBuf::from(PAIR_ID_DOTFILE));
    paths
}

/// Reads a pairing identifier file, returning `None` for missing or
/// blank files.
fn read_pair_id_file(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    let id = contents.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    #[test]
    fn test_explicit_id_wins() {
        let id = resolve_pair_id(Some("aa4a737ffd756c6d")).expect("resolve");
        assert_eq!(id, "aa4a737ffd756c6d");
    }

    #[test]
    fn test_explicit_id_is_trimmed() {
        let id = resolve_pair_id(Some("  aa4a737ffd756c6d\n")).expect("resolve");
        assert_eq!(id, "aa4a737ffd756c6d");
    }

    #[test]
    fn test_read_pair_id_file() {
        let mut file = NamedTempFile::new().expect("tempfile");
        writeln!(file, "aa4a737ffd756c6d").expect("write");

        let id = read_pair_id_file(file.path()).expect("id");
        assert_eq!(id, "aa4a737ffd756c6d");
    }

    #[test]
    fn test_blank_file_is_skipped() {
        let mut file = NamedTempFile::new().expect("tempfile");
        writeln!(file, "   \n").expect("write");

        assert!(read_pair_id_file(file.path()).is_none());
    }

    #[test]
    fn test_missing_file_is_skipped() {
        assert!(read_pair_id_file(Path::new("/nonexistent/quietcool")).is_none());
    }

    #[test]
    fn test_candidate_files_order() {
        let paths = candidate_files();
        assert_eq!(paths.first(), Some(&PathBuf::from("/etc/quietcool")));
        assert_eq!(paths.last(), Some(&PathBuf::from(".quietcool")));
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new("id");
        assert_eq!(config.name_prefix, "ATTICFAN");
        assert_eq!(config.discovery_timeout, Duration::from_secs(3));
        assert_eq!(config.chunk_size, 20);
    }
}

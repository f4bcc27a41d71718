//! # Graph Store Trait
//!
//! The contract between the graph caches and a persistence medium. An entry
//! is a named, append-only sequence of records that becomes visible only
//! after an explicit commit.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-process, shared between cache instances |
//! | `FileStore` | `file` | One JSON-lines file per entry plus a completion marker |

pub mod memory;
pub mod file;

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Result;

pub use file::FileStore;
pub use memory::MemoryStore;

// ============================================================================
// Store Configuration
// ============================================================================

/// Where generated graph lists are persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// No persistence; lists live as long as the caches.
    #[default]
    InMemory,

    /// One file per entry under `data_dir`, created on open.
    Directory { data_dir: PathBuf },
}

impl StoreConfig {
    /// The configured store, `None` for in-memory caching.
    pub fn open(&self) -> Result<Option<Arc<dyn GraphStore>>> {
        match self {
            StoreConfig::InMemory => Ok(None),
            StoreConfig::Directory { data_dir } => Ok(Some(Arc::new(FileStore::open(data_dir)?))),
        }
    }
}

// ============================================================================
// GraphStore Trait
// ============================================================================

/// Append/commit persistence of record sequences.
///
/// A committed entry is never written again. Partial entries (appended but
/// not committed) are invisible to `load` and are removed by `discard`.
pub trait GraphStore: Send + Sync + 'static {
    /// Records of a committed entry, `None` if absent or incomplete.
    fn load(&self, name: &str) -> Result<Option<Vec<String>>>;

    fn append(&self, name: &str, records: &[String]) -> Result<()>;

    /// Mark the entry complete.
    fn commit(&self, name: &str) -> Result<()>;

    /// Remove the entry, committed or not.
    fn discard(&self, name: &str) -> Result<()>;

    /// Human-readable location, for log lines.
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserializes() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"kind": "directory", "data_dir": "/tmp/graphs"}"#).unwrap();
        assert_eq!(config, StoreConfig::Directory { data_dir: PathBuf::from("/tmp/graphs") });
        let config: StoreConfig = serde_json::from_str(r#"{"kind": "in_memory"}"#).unwrap();
        assert_eq!(config, StoreConfig::InMemory);
    }
}

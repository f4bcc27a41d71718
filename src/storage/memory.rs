//! In-memory graph store.
//!
//! This is the reference implementation of `GraphStore`. Clones share the
//! same entries, so two cache instances built on one `MemoryStore` observe
//! each other's commits the way two processes sharing a directory would.
//!
//! ## Limitations
//!
//! - **Process-local**: nothing survives the process.
//! - **Coarse locking**: one `RwLock` over all entries.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::GraphStore;
use crate::Result;

// ============================================================================
// MemoryStore
// ============================================================================

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    entries: RwLock<HashMap<String, Entry>>,
}

#[derive(Default)]
struct Entry {
    records: Vec<String>,
    committed: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of committed entries, sorted.
    pub fn committed_entries(&self) -> Vec<String> {
        let entries = self.inner.entries.read();
        let mut names: Vec<String> =
            entries.iter().filter(|(_, e)| e.committed).map(|(name, _)| name.clone()).collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.inner.entries.read().len())
            .finish()
    }
}

// ============================================================================
// GraphStore impl
// ============================================================================

impl GraphStore for MemoryStore {
    fn load(&self, name: &str) -> Result<Option<Vec<String>>> {
        let entries = self.inner.entries.read();
        Ok(entries.get(name).filter(|e| e.committed).map(|e| e.records.clone()))
    }

    fn append(&self, name: &str, records: &[String]) -> Result<()> {
        let mut entries = self.inner.entries.write();
        let entry = entries.entry(name.to_string()).or_default();
        entry.records.extend_from_slice(records);
        Ok(())
    }

    fn commit(&self, name: &str) -> Result<()> {
        let mut entries = self.inner.entries.write();
        entries.entry(name.to_string()).or_default().committed = true;
        Ok(())
    }

    fn discard(&self, name: &str) -> Result<()> {
        self.inner.entries.write().remove(name);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

//! # Graph Caches
//!
//! Memoized lists of canonical graphs, one list per `(shape, options)`.
//!
//! A list is generated on first request, optionally persisted through a
//! [`GraphStore`], and never regenerated afterwards: list positions are
//! handed out as basis indices, so a committed list is frozen.
//!
//! ```text
//! graphs(shape, options)
//!   ├── memo table hit ──────────────────────────► shared list
//!   ├── store has committed entry ── decode ─────► shared list
//!   └── discard partial entry ── generate ── append ── commit ─► shared list
//! ```

pub mod undirected;
pub mod directed;
pub mod formality;

use std::hash::Hash;
use std::ops::Deref;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::generate::{DirectedOptions, FormalityOptions, Generator, UndirectedOptions};
use crate::model::{FormalityGraph, Graph, UndirectedGraph};
use crate::storage::{GraphStore, StoreConfig};
use crate::{Error, Result};

pub use directed::OrientationRecord;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// Continue without persistence if the store cannot be opened.
    #[serde(default)]
    pub allow_memory_fallback: bool,
}

// ============================================================================
// GraphList
// ============================================================================

/// Shared, immutable, ordered list of canonical graphs.
#[derive(Debug)]
pub struct GraphList<G> {
    graphs: Arc<[G]>,
}

impl<G> Clone for GraphList<G> {
    fn clone(&self) -> Self {
        Self { graphs: Arc::clone(&self.graphs) }
    }
}

impl<G: PartialEq> GraphList<G> {
    pub fn new(graphs: Vec<G>) -> Self {
        Self { graphs: graphs.into() }
    }

    /// Position of `graph`, compared by value.
    pub fn index_of(&self, graph: &G) -> Option<usize> {
        self.graphs.iter().position(|g| g == graph)
    }

    /// Whether both handles point at the same list.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.graphs, &other.graphs)
    }
}

impl<G> Deref for GraphList<G> {
    type Target = [G];

    fn deref(&self) -> &[G] {
        &self.graphs
    }
}

// ============================================================================
// MemoTable
// ============================================================================

/// Append-only map with compute-on-first-access.
///
/// Lookups take a read lock; a miss takes the table's compute lock, so each
/// key is computed at most once even when the table is shared.
pub struct MemoTable<K, V> {
    entries: RwLock<HashMap<K, V>>,
    compute: Mutex<()>,
}

impl<K: Eq + Hash, V: Clone> MemoTable<K, V> {
    pub fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()), compute: Mutex::new(()) }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    /// The value for `key`, running `compute` if absent. Errors are not
    /// memoized.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let _guard = self.compute.lock();
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        self.entries.write().insert(key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, V: Clone> Default for MemoTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// GraphCaches
// ============================================================================

/// The undirected, directed and formality caches behind one handle.
///
/// Cloning is cheap and shares the tables. Create one per process (or per
/// test) and pass it to every basis.
#[derive(Clone)]
pub struct GraphCaches {
    inner: Arc<CachesInner>,
}

struct CachesInner {
    generator: Generator,
    store: Option<Arc<dyn GraphStore>>,
    undirected: MemoTable<(usize, usize, UndirectedOptions), GraphList<UndirectedGraph>>,
    directed: MemoTable<(usize, usize, DirectedOptions), directed::DirectedEntry>,
    formality: MemoTable<(usize, usize, usize, FormalityOptions), GraphList<FormalityGraph>>,
}

impl GraphCaches {
    pub fn new(generator: Generator, store: Option<Arc<dyn GraphStore>>) -> Self {
        Self {
            inner: Arc::new(CachesInner {
                generator,
                store,
                undirected: MemoTable::new(),
                directed: MemoTable::new(),
                formality: MemoTable::new(),
            }),
        }
    }

    /// Process-local caches with the bundled oracles.
    pub fn in_memory() -> Self {
        Self::new(Generator::default(), None)
    }

    /// Caches persisted through `store`, with the bundled oracles.
    pub fn with_store(store: Arc<dyn GraphStore>) -> Self {
        Self::new(Generator::default(), Some(store))
    }

    pub fn open(config: &CacheConfig) -> Result<Self> {
        Self::open_with(config, Generator::default())
    }

    pub fn open_with(config: &CacheConfig, generator: Generator) -> Result<Self> {
        let store = match config.store.open() {
            Ok(store) => store,
            Err(err @ Error::CacheStorageUnavailable { .. }) if config.allow_memory_fallback => {
                warn!(error = %err, "graph store unavailable, caching in memory only");
                None
            }
            Err(err) => return Err(err),
        };
        if let Some(store) = &store {
            info!(store = %store.describe(), "graph caches opened");
        }
        Ok(Self::new(generator, store))
    }

    pub fn generator(&self) -> &Generator {
        &self.inner.generator
    }

    pub fn is_persistent(&self) -> bool {
        self.inner.store.is_some()
    }

    /// Load the committed entry `name`, or generate, persist and commit it.
    fn load_or_generate<G, F>(&self, name: &str, generate: F) -> Result<Vec<G>>
    where
        G: Graph,
        F: FnOnce() -> Result<Vec<G>>,
    {
        let Some(store) = &self.inner.store else {
            return generate_in_context(name, generate);
        };
        if let Some(graphs) = load_entry(store.as_ref(), name)? {
            debug!(entry = name, count = graphs.len(), "graph list loaded from store");
            return Ok(graphs);
        }
        store.discard(name)?;
        let graphs = generate_in_context(name, generate)?;
        store.append(name, &encode(&graphs)?)?;
        store.commit(name)?;
        info!(entry = name, count = graphs.len(), "graph list committed");
        Ok(graphs)
    }
}

impl std::fmt::Debug for GraphCaches {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphCaches")
            .field("persistent", &self.is_persistent())
            .field("undirected", &self.inner.undirected.len())
            .field("directed", &self.inner.directed.len())
            .field("formality", &self.inner.formality.len())
            .finish()
    }
}

fn generate_in_context<T, F>(name: &str, generate: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    generate().map_err(|source| Error::GenerationFailed {
        context: name.trim_end_matches(".db").to_string(),
        source: Box::new(source),
    })
}

pub(crate) fn encode<T: Serialize>(items: &[T]) -> Result<Vec<String>> {
    items.iter().map(|item| serde_json::to_string(item).map_err(Error::from)).collect()
}

pub(crate) fn decode<T: DeserializeOwned>(records: &[String]) -> Result<Vec<T>> {
    records.iter().map(|record| serde_json::from_str(record).map_err(Error::from)).collect()
}

/// A committed entry, decoded. An undecodable entry counts as absent.
pub(crate) fn load_entry<T: DeserializeOwned>(store: &dyn GraphStore, name: &str) -> Result<Option<Vec<T>>> {
    let Some(records) = store.load(name)? else {
        return Ok(None);
    };
    match decode(&records) {
        Ok(items) => Ok(Some(items)),
        Err(err) => {
            warn!(entry = name, error = %err, "malformed store entry, regenerating");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_memo_table_computes_once() {
        let table: MemoTable<u32, Arc<String>> = MemoTable::new();
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok(Arc::new("value".to_string()))
        };
        let a = table.get_or_compute(7, compute).unwrap();
        let b = table.get_or_compute(7, compute).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_memo_table_does_not_keep_errors() {
        let table: MemoTable<u32, u32> = MemoTable::new();
        let err = table.get_or_compute(1, || Err(Error::OracleFailure("boom".into())));
        assert!(err.is_err());
        assert!(table.is_empty());
        assert_eq!(table.get_or_compute(1, || Ok(5)).unwrap(), 5);
    }

    #[test]
    fn test_graph_list_index_by_value() {
        let a = UndirectedGraph::new(2, vec![(0, 1)]).unwrap();
        let b = UndirectedGraph::new(2, vec![]).unwrap();
        let list = GraphList::new(vec![a.clone()]);
        assert_eq!(list.index_of(&a), Some(0));
        assert_eq!(list.index_of(&b), None);
        assert!(list.ptr_eq(&list.clone()));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_fallback_to_memory() {
        let blocker = std::env::temp_dir().join(format!("graph-complex-blocker-{}", std::process::id()));
        std::fs::write(&blocker, b"file, not a directory").unwrap();
        let store = StoreConfig::Directory { data_dir: blocker.join("data") };

        let strict = CacheConfig { store: store.clone(), allow_memory_fallback: false };
        assert!(matches!(
            GraphCaches::open(&strict),
            Err(Error::CacheStorageUnavailable { .. })
        ));

        let lenient = CacheConfig { store, allow_memory_fallback: true };
        let caches = GraphCaches::open(&lenient).unwrap();
        assert!(!caches.is_persistent());
        std::fs::remove_file(&blocker).unwrap();
    }

    #[test]
    fn test_config_defaults() {
        let config: CacheConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CacheConfig::default());
        assert!(!GraphCaches::open(&config).unwrap().is_persistent());
    }
}

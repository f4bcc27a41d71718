//! Undirected graph lists.

use tracing::debug;

use super::{GraphCaches, GraphList};
use crate::Result;
use crate::generate::UndirectedOptions;
use crate::model::UndirectedGraph;

impl GraphCaches {
    /// Canonical undirected graphs with `num_vertices` vertices and
    /// `num_edges` edges passing `options`, in a fixed order.
    pub fn undirected_graphs(
        &self,
        num_vertices: usize,
        num_edges: usize,
        options: &UndirectedOptions,
    ) -> Result<GraphList<UndirectedGraph>> {
        let key = (num_vertices, num_edges, options.clone());
        self.inner.undirected.get_or_compute(key, || {
            let name = options.entry_name(num_vertices, num_edges);
            debug!(entry = %name, "undirected cache miss");
            let graphs = self.load_or_generate(&name, || {
                self.generator().undirected_graphs(num_vertices, num_edges, options)
            })?;
            Ok(GraphList::new(graphs))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_second_call_is_memoized() {
        let caches = GraphCaches::in_memory();
        let options = UndirectedOptions { connected: true, ..UndirectedOptions::default() };
        let first = caches.undirected_graphs(4, 3, &options).unwrap();
        let second = caches.undirected_graphs(4, 3, &options).unwrap();
        assert!(first.ptr_eq(&second));
        // path and star
        assert_eq!(first.len(), 2);
        // both have a reflection swapping an odd number of edge pairs
        let even = caches.undirected_graphs(4, 3, &UndirectedOptions::even(true, false, 0)).unwrap();
        assert!(even.is_empty());
    }

    #[test]
    fn test_entry_is_committed_under_its_name() {
        let store = MemoryStore::new();
        let caches = GraphCaches::with_store(Arc::new(store.clone()));
        caches.undirected_graphs(2, 1, &UndirectedOptions::even(false, false, 0)).unwrap();
        assert_eq!(store.committed_entries(), vec!["u_2_1_even.db".to_string()]);
    }
}

//! Directed graph lists, built from undirected ones.
//!
//! Besides the list itself the cache records how the undirected graphs of
//! the same shape map to their orientations: `(undirected_index,
//! directed_index, coefficient)` triples, persisted as a second store entry
//! prefixed `u_to_`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{GraphCaches, GraphList, encode, generate_in_context, load_entry};
use crate::Result;
use crate::generate::DirectedOptions;
use crate::model::DirectedGraph;

/// One term of the orientation map from undirected to directed graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrientationRecord {
    pub undirected_index: usize,
    pub directed_index: usize,
    pub coefficient: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct DirectedEntry {
    graphs: GraphList<DirectedGraph>,
    orientations: Arc<[OrientationRecord]>,
}

impl GraphCaches {
    /// Canonical directed graphs with `num_vertices` vertices and
    /// `num_edges` arcs passing `options`, in a fixed order.
    pub fn directed_graphs(
        &self,
        num_vertices: usize,
        num_edges: usize,
        options: &DirectedOptions,
    ) -> Result<GraphList<DirectedGraph>> {
        Ok(self.directed_entry(num_vertices, num_edges, options)?.graphs)
    }

    /// All orientation records of a directed list.
    pub fn orientation_records(
        &self,
        num_vertices: usize,
        num_edges: usize,
        options: &DirectedOptions,
    ) -> Result<Arc<[OrientationRecord]>> {
        Ok(self.directed_entry(num_vertices, num_edges, options)?.orientations)
    }

    /// `(directed_index, coefficient)` for the undirected graph at
    /// `undirected_index` in the list `undirected_graphs(num_vertices,
    /// num_edges, options.undirected())`.
    pub fn undirected_to_directed(
        &self,
        num_vertices: usize,
        num_edges: usize,
        options: &DirectedOptions,
        undirected_index: usize,
    ) -> Result<Vec<(usize, i64)>> {
        let records = self.orientation_records(num_vertices, num_edges, options)?;
        Ok(records
            .iter()
            .filter(|r| r.undirected_index == undirected_index)
            .map(|r| (r.directed_index, r.coefficient))
            .collect())
    }

    fn directed_entry(
        &self,
        num_vertices: usize,
        num_edges: usize,
        options: &DirectedOptions,
    ) -> Result<DirectedEntry> {
        let key = (num_vertices, num_edges, options.clone());
        self.inner.directed.get_or_compute(key, || {
            let name = options.entry_name(num_vertices, num_edges);
            let orientation_name = format!("u_to_{name}");
            debug!(entry = %name, "directed cache miss");

            if let Some(store) = &self.inner.store {
                let graphs = load_entry(store.as_ref(), &name)?;
                let records = load_entry(store.as_ref(), &orientation_name)?;
                if let (Some(graphs), Some(records)) = (graphs, records) {
                    debug!(entry = %name, "directed graph list loaded from store");
                    return Ok(DirectedEntry::new(graphs, records));
                }
                store.discard(&name)?;
                store.discard(&orientation_name)?;
            }

            let (graphs, records) = generate_in_context(&name, || {
                self.generate_directed(num_vertices, num_edges, options)
            })?;

            if let Some(store) = &self.inner.store {
                store.append(&orientation_name, &encode(&records)?)?;
                store.append(&name, &encode(&graphs)?)?;
                store.commit(&orientation_name)?;
                store.commit(&name)?;
                info!(entry = %name, count = graphs.len(), records = records.len(), "directed graph list committed");
            }
            Ok(DirectedEntry::new(graphs, records))
        })
    }

    fn generate_directed(
        &self,
        num_vertices: usize,
        num_edges: usize,
        options: &DirectedOptions,
    ) -> Result<(Vec<DirectedGraph>, Vec<OrientationRecord>)> {
        let generator = self.generator();
        let max_loop_order = if options.allows_loops() { num_edges / 2 } else { 0 };
        let undirected = self.undirected_graphs(num_vertices, num_edges, &options.undirected())?;

        let mut graphs = Vec::new();
        let mut records = Vec::new();
        for loop_order in 0..=max_loop_order {
            let underlying =
                self.undirected_graphs(num_vertices, num_edges - loop_order, &options.underlying())?;
            for g in underlying.iter() {
                // only 2-cycle-free graphs are orientations of an undirected graph
                let undirected_index = if loop_order == 0 { undirected.index_of(g) } else { None };
                let orientations =
                    generator.orientations(g, num_edges, options.allows_loops(), options.has_odd_automorphism)?;
                for h in orientations {
                    if let Some(undirected_index) = undirected_index {
                        records.push(OrientationRecord {
                            undirected_index,
                            directed_index: graphs.len(),
                            coefficient: generator.orientation_coefficient(g, &h)?,
                        });
                    }
                    graphs.push(h);
                }
            }
        }
        Ok((graphs, records))
    }
}

impl DirectedEntry {
    fn new(graphs: Vec<DirectedGraph>, records: Vec<OrientationRecord>) -> Self {
        Self { graphs: GraphList::new(graphs), orientations: records.into() }
    }
}

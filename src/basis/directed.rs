//! The directed graph complex basis.

use super::{BasisKey, GraphBasis, UndirectedGraphComplexBasis, list_key};
use crate::Result;
use crate::cache::{GraphCaches, GraphList};
use crate::generate::DirectedOptions;
use crate::model::{DirectedGraph, Graph, Sign};

/// Isomorphism classes of directed graphs without odd automorphisms, keyed
/// by `(vertices, edges, index)`.
///
/// `loops` controls 2-cycles: `Some(false)` excludes them, anything else
/// admits them.
#[derive(Debug, Clone)]
pub struct DirectedGraphComplexBasis {
    caches: GraphCaches,
    options: DirectedOptions,
}

impl DirectedGraphComplexBasis {
    pub fn new(
        caches: GraphCaches,
        connected: bool,
        biconnected: bool,
        min_degree: usize,
        loops: Option<bool>,
    ) -> Self {
        Self { caches, options: DirectedOptions::even(connected, biconnected, min_degree, loops) }
    }

    pub fn options(&self) -> &DirectedOptions {
        &self.options
    }

    pub fn graphs(&self, num_vertices: usize, num_edges: usize) -> Result<GraphList<DirectedGraph>> {
        self.caches.directed_graphs(num_vertices, num_edges, &self.options)
    }

    pub fn cardinality(&self, num_vertices: usize, num_edges: usize) -> Result<usize> {
        Ok(self.graphs(num_vertices, num_edges)?.len())
    }

    /// The undirected basis whose keys [`undirected_to_directed`] accepts.
    ///
    /// [`undirected_to_directed`]: Self::undirected_to_directed
    pub fn undirected_basis(&self) -> Result<UndirectedGraphComplexBasis> {
        let DirectedOptions { connected, biconnected, min_degree, .. } = self.options;
        UndirectedGraphComplexBasis::new(self.caches.clone(), connected, biconnected, min_degree)
    }

    /// Image of an undirected basis element under the orientation map: the
    /// directed keys of its orientations with their coefficients.
    pub fn undirected_to_directed(&self, undirected_key: &BasisKey) -> Result<Vec<(BasisKey, i64)>> {
        let &[v, e, index] = undirected_key.as_slice() else {
            return Ok(Vec::new());
        };
        let terms = self.caches.undirected_to_directed(v, e, &self.options, index)?;
        Ok(terms
            .into_iter()
            .filter(|&(_, coefficient)| coefficient != 0)
            .map(|(directed_index, coefficient)| (BasisKey::new(&[v, e, directed_index]), coefficient))
            .collect())
    }
}

impl GraphBasis for DirectedGraphComplexBasis {
    type Graph = DirectedGraph;

    fn grading_size(&self) -> usize {
        2
    }

    fn graph_to_key(&self, graph: &DirectedGraph) -> Result<Option<(BasisKey, Sign)>> {
        let canonical = self.caches.generator().canonicalizer().canonicalize(graph)?;
        let [v, e] = graph.shape();
        Ok(list_key(&[v, e], &canonical, &self.graphs(v, e)?, false))
    }

    fn key_to_graph(&self, key: &BasisKey) -> Result<Option<(DirectedGraph, Sign)>> {
        let &[v, e, index] = key.as_slice() else {
            return Ok(None);
        };
        Ok(self.graphs(v, e)?.get(index).map(|g| (g.clone(), Sign::Plus)))
    }

    fn describe(&self) -> String {
        let DirectedOptions { connected, biconnected, min_degree, loops, .. } = self.options;
        format!(
            "Basis consisting of representatives of isomorphism classes of directed graphs with no automorphisms that induce an odd permutation on edges (connected={connected}, biconnected={biconnected}, min_degree={min_degree}, loops={loops:?})"
        )
    }
}

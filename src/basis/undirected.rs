//! Bases of undirected graphs: the graph complex and the operad.

use super::{BasisKey, GraphBasis, list_key, undo_relabeling};
use crate::cache::{GraphCaches, GraphList};
use crate::generate::UndirectedOptions;
use crate::model::{Graph, Sign, UndirectedGraph};
use crate::{Error, Result};

// ============================================================================
// UndirectedGraphComplexBasis
// ============================================================================

/// Isomorphism classes of undirected graphs without odd automorphisms,
/// keyed by `(vertices, edges, index)`.
#[derive(Debug, Clone)]
pub struct UndirectedGraphComplexBasis {
    caches: GraphCaches,
    options: UndirectedOptions,
}

impl UndirectedGraphComplexBasis {
    /// `min_degree` must be 0 (no bound) or 3.
    pub fn new(caches: GraphCaches, connected: bool, biconnected: bool, min_degree: usize) -> Result<Self> {
        if min_degree != 0 && min_degree != 3 {
            return Err(Error::InvalidOptions(format!(
                "min_degree must be 0 or 3, got {min_degree}"
            )));
        }
        Ok(Self { caches, options: UndirectedOptions::even(connected, biconnected, min_degree) })
    }

    pub fn options(&self) -> &UndirectedOptions {
        &self.options
    }

    pub fn graphs(&self, num_vertices: usize, num_edges: usize) -> Result<GraphList<UndirectedGraph>> {
        self.caches.undirected_graphs(num_vertices, num_edges, &self.options)
    }

    /// Dimension of the graded piece.
    pub fn cardinality(&self, num_vertices: usize, num_edges: usize) -> Result<usize> {
        Ok(self.graphs(num_vertices, num_edges)?.len())
    }
}

impl GraphBasis for UndirectedGraphComplexBasis {
    type Graph = UndirectedGraph;

    fn grading_size(&self) -> usize {
        2
    }

    fn graph_to_key(&self, graph: &UndirectedGraph) -> Result<Option<(BasisKey, Sign)>> {
        let canonical = self.caches.generator().canonicalizer().canonicalize(graph)?;
        let [v, e] = graph.shape();
        Ok(list_key(&[v, e], &canonical, &self.graphs(v, e)?, false))
    }

    fn key_to_graph(&self, key: &BasisKey) -> Result<Option<(UndirectedGraph, Sign)>> {
        let &[v, e, index] = key.as_slice() else {
            return Ok(None);
        };
        Ok(self.graphs(v, e)?.get(index).map(|g| (g.clone(), Sign::Plus)))
    }

    fn describe(&self) -> String {
        let UndirectedOptions { connected, biconnected, min_degree, .. } = self.options;
        format!(
            "Basis consisting of representatives of isomorphism classes of undirected graphs with no automorphisms that induce an odd permutation on edges (connected={connected}, biconnected={biconnected}, min_degree={min_degree})"
        )
    }
}

// ============================================================================
// UndirectedGraphOperadBasis
// ============================================================================

/// Labeled undirected graphs: the key remembers the permutation from the
/// canonical representative back to the given labeling.
#[derive(Debug, Clone)]
pub struct UndirectedGraphOperadBasis {
    caches: GraphCaches,
    options: UndirectedOptions,
}

impl UndirectedGraphOperadBasis {
    pub fn new(caches: GraphCaches) -> Self {
        Self { caches, options: UndirectedOptions::even(false, false, 0) }
    }

    pub fn graphs(&self, num_vertices: usize, num_edges: usize) -> Result<GraphList<UndirectedGraph>> {
        self.caches.undirected_graphs(num_vertices, num_edges, &self.options)
    }
}

impl GraphBasis for UndirectedGraphOperadBasis {
    type Graph = UndirectedGraph;

    fn grading_size(&self) -> usize {
        2
    }

    fn graph_to_key(&self, graph: &UndirectedGraph) -> Result<Option<(BasisKey, Sign)>> {
        let canonical = self.caches.generator().canonicalizer().canonicalize(graph)?;
        let [v, e] = graph.shape();
        Ok(list_key(&[v, e], &canonical, &self.graphs(v, e)?, true))
    }

    fn key_to_graph(&self, key: &BasisKey) -> Result<Option<(UndirectedGraph, Sign)>> {
        let &[v, e, index, ref undo @ ..] = key.as_slice() else {
            return Ok(None);
        };
        let list = self.graphs(v, e)?;
        Ok(list.get(index).and_then(|g| undo_relabeling(g, undo)))
    }

    fn describe(&self) -> String {
        "Operad basis consisting of representatives of isomorphism classes of undirected graphs with no automorphisms that induce an odd permutation on edges".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_min_degree_is_validated() {
        let caches = GraphCaches::in_memory();
        assert!(UndirectedGraphComplexBasis::new(caches.clone(), true, false, 3).is_ok());
        assert!(matches!(
            UndirectedGraphComplexBasis::new(caches, true, false, 2),
            Err(Error::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_single_edge_key() {
        let basis = UndirectedGraphComplexBasis::new(GraphCaches::in_memory(), true, false, 0).unwrap();
        let g = UndirectedGraph::new(2, vec![(0, 1)]).unwrap();
        let (key, sign) = basis.graph_to_key(&g).unwrap().unwrap();
        assert_eq!(key.as_slice(), &[2, 1, 0]);
        assert_eq!(sign, Sign::Plus);
        let (back, sign) = basis.key_to_graph(&key).unwrap().unwrap();
        assert_eq!(back, g);
        assert_eq!(sign, Sign::Plus);
    }

    #[test]
    fn test_out_of_span() {
        let basis = UndirectedGraphComplexBasis::new(GraphCaches::in_memory(), true, false, 0).unwrap();
        // disconnected
        let g = UndirectedGraph::new(3, vec![(0, 1)]).unwrap();
        assert_eq!(basis.graph_to_key(&g).unwrap(), None);
        assert_eq!(basis.key_to_graph(&BasisKey::new(&[2, 1, 7])).unwrap(), None);
        assert_eq!(basis.key_to_graph(&BasisKey::new(&[2, 1])).unwrap(), None);
        assert_eq!(basis.cardinality(2, 1).unwrap(), 1);
    }

    #[test]
    fn test_operad_key_recovers_labeling() {
        let basis = UndirectedGraphOperadBasis::new(GraphCaches::in_memory());
        let g = UndirectedGraph::new(3, vec![(1, 2)]).unwrap();
        let (key, _) = basis.graph_to_key(&g).unwrap().unwrap();
        assert_eq!(key.grading(basis.grading_size()), &[3, 1]);
        let (back, sign) = basis.key_to_graph(&key).unwrap().unwrap();
        assert_eq!(back, g);
        assert_eq!(sign, Sign::Plus);
    }
}

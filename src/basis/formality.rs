//! Bases of formality graphs: the complex, its lazy variant, and the
//! operad.

use super::{BasisKey, GraphBasis, list_key, undo_relabeling};
use crate::Result;
use crate::cache::{GraphCaches, GraphList};
use crate::generate::FormalityOptions;
use crate::model::{FormalityGraph, Graph, Sign};

fn even_options(
    positive_differential_order: Option<bool>,
    connected: Option<bool>,
    loops: Option<bool>,
) -> FormalityOptions {
    FormalityOptions {
        positive_differential_order,
        connected,
        loops,
        has_odd_automorphism: Some(false),
        ..FormalityOptions::default()
    }
}

fn describe_options(options: &FormalityOptions) -> String {
    format!(
        "positive_differential_order={:?}, connected={:?}, loops={:?}",
        options.positive_differential_order, options.connected, options.loops
    )
}

// ============================================================================
// FormalityGraphComplexBasis
// ============================================================================

/// Formality graphs without odd automorphisms, keyed by
/// `(ground, aerial, edges, index)`.
#[derive(Debug, Clone)]
pub struct FormalityGraphComplexBasis {
    caches: GraphCaches,
    options: FormalityOptions,
}

impl FormalityGraphComplexBasis {
    pub fn new(
        caches: GraphCaches,
        positive_differential_order: Option<bool>,
        connected: Option<bool>,
        loops: Option<bool>,
    ) -> Self {
        Self { caches, options: even_options(positive_differential_order, connected, loops) }
    }

    pub fn options(&self) -> &FormalityOptions {
        &self.options
    }

    pub fn graphs(&self, num_ground: usize, num_aerial: usize, num_edges: usize) -> Result<GraphList<FormalityGraph>> {
        self.caches.formality_graphs(num_ground, num_aerial, num_edges, &self.options)
    }

    pub fn cardinality(&self, num_ground: usize, num_aerial: usize, num_edges: usize) -> Result<usize> {
        Ok(self.graphs(num_ground, num_aerial, num_edges)?.len())
    }
}

impl GraphBasis for FormalityGraphComplexBasis {
    type Graph = FormalityGraph;

    fn grading_size(&self) -> usize {
        3
    }

    fn graph_to_key(&self, graph: &FormalityGraph) -> Result<Option<(BasisKey, Sign)>> {
        let canonical = self.caches.generator().canonicalizer().canonicalize(graph)?;
        let [gv, av, e] = graph.shape();
        Ok(list_key(&[gv, av, e], &canonical, &self.graphs(gv, av, e)?, false))
    }

    fn key_to_graph(&self, key: &BasisKey) -> Result<Option<(FormalityGraph, Sign)>> {
        let &[gv, av, e, index] = key.as_slice() else {
            return Ok(None);
        };
        Ok(self.graphs(gv, av, e)?.get(index).map(|g| (g.clone(), Sign::Plus)))
    }

    fn describe(&self) -> String {
        format!(
            "Basis consisting of representatives of isomorphism classes of formality graphs with no automorphisms that induce an odd permutation on edges ({})",
            describe_options(&self.options)
        )
    }
}

// ============================================================================
// FormalityGraphComplexBasisLazy
// ============================================================================

/// Like [`FormalityGraphComplexBasis`], but the key carries the canonical
/// edge list itself, so no graph list is ever generated.
///
/// The structural options are not enforced: every graph without an odd
/// automorphism has a key.
#[derive(Debug, Clone)]
pub struct FormalityGraphComplexBasisLazy {
    caches: GraphCaches,
    options: FormalityOptions,
}

impl FormalityGraphComplexBasisLazy {
    pub fn new(
        caches: GraphCaches,
        positive_differential_order: Option<bool>,
        connected: Option<bool>,
        loops: Option<bool>,
    ) -> Self {
        Self { caches, options: even_options(positive_differential_order, connected, loops) }
    }
}

impl GraphBasis for FormalityGraphComplexBasisLazy {
    type Graph = FormalityGraph;

    fn grading_size(&self) -> usize {
        3
    }

    fn graph_to_key(&self, graph: &FormalityGraph) -> Result<Option<(BasisKey, Sign)>> {
        let canonicalizer = self.caches.generator().canonicalizer();
        if canonicalizer.has_odd_automorphism(graph)? {
            return Ok(None);
        }
        let canonical = canonicalizer.canonicalize(graph)?;
        let key: BasisKey = graph
            .shape()
            .into_iter()
            .chain(canonical.graph.edges().iter().flat_map(|&(a, b)| [a, b]))
            .collect();
        Ok(Some((key, canonical.sign)))
    }

    fn key_to_graph(&self, key: &BasisKey) -> Result<Option<(FormalityGraph, Sign)>> {
        let &[gv, av, e, ref flat @ ..] = key.as_slice() else {
            return Ok(None);
        };
        if flat.len() != 2 * e {
            return Ok(None);
        }
        let edges = flat.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();
        let Ok(graph) = FormalityGraph::new(gv, av, edges) else {
            return Ok(None);
        };
        if graph.has_multi_edges() || self.caches.generator().canonicalizer().has_odd_automorphism(&graph)? {
            return Ok(None);
        }
        Ok(Some((graph, Sign::Plus)))
    }

    fn describe(&self) -> String {
        format!(
            "Lazy basis consisting of representatives of isomorphism classes of formality graphs with no automorphisms that induce an odd permutation on edges ({})",
            describe_options(&self.options)
        )
    }
}

// ============================================================================
// FormalityGraphOperadBasis
// ============================================================================

/// Labeled formality graphs, keyed by `(ground, aerial, edges, index,
/// undo…)`.
#[derive(Debug, Clone)]
pub struct FormalityGraphOperadBasis {
    caches: GraphCaches,
    options: FormalityOptions,
}

impl FormalityGraphOperadBasis {
    pub fn new(
        caches: GraphCaches,
        positive_differential_order: Option<bool>,
        connected: Option<bool>,
        loops: Option<bool>,
    ) -> Self {
        Self { caches, options: even_options(positive_differential_order, connected, loops) }
    }

    pub fn graphs(&self, num_ground: usize, num_aerial: usize, num_edges: usize) -> Result<GraphList<FormalityGraph>> {
        self.caches.formality_graphs(num_ground, num_aerial, num_edges, &self.options)
    }
}

impl GraphBasis for FormalityGraphOperadBasis {
    type Graph = FormalityGraph;

    fn grading_size(&self) -> usize {
        3
    }

    fn graph_to_key(&self, graph: &FormalityGraph) -> Result<Option<(BasisKey, Sign)>> {
        let canonical = self.caches.generator().canonicalizer().canonicalize(graph)?;
        let [gv, av, e] = graph.shape();
        Ok(list_key(&[gv, av, e], &canonical, &self.graphs(gv, av, e)?, true))
    }

    fn key_to_graph(&self, key: &BasisKey) -> Result<Option<(FormalityGraph, Sign)>> {
        let &[gv, av, e, index, ref undo @ ..] = key.as_slice() else {
            return Ok(None);
        };
        let list = self.graphs(gv, av, e)?;
        Ok(list.get(index).and_then(|g| undo_relabeling(g, undo)))
    }

    fn describe(&self) -> String {
        format!(
            "Operad basis consisting of representatives of isomorphism classes of formality graphs with no automorphisms that induce an odd permutation on edges ({})",
            describe_options(&self.options)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wedge() -> FormalityGraph {
        FormalityGraph::new(2, 1, vec![(2, 0), (2, 1)]).unwrap()
    }

    #[test]
    fn test_wedge_key() {
        let basis = FormalityGraphComplexBasis::new(GraphCaches::in_memory(), None, None, None);
        let (key, sign) = basis.graph_to_key(&wedge()).unwrap().unwrap();
        assert_eq!(key.grading(basis.grading_size()), &[2, 1, 2]);
        assert_eq!(sign, Sign::Plus);
        let (back, _) = basis.key_to_graph(&key).unwrap().unwrap();
        assert_eq!(back, wedge());

        // swapping the edge order flips the sign
        let swapped = FormalityGraph::new(2, 1, vec![(2, 1), (2, 0)]).unwrap();
        let (swapped_key, sign) = basis.graph_to_key(&swapped).unwrap().unwrap();
        assert_eq!(swapped_key, key);
        assert_eq!(sign, Sign::Minus);
    }

    #[test]
    fn test_lazy_key_carries_edges() {
        let basis = FormalityGraphComplexBasisLazy::new(GraphCaches::in_memory(), None, None, None);
        let (key, sign) = basis.graph_to_key(&wedge()).unwrap().unwrap();
        assert_eq!(key.as_slice(), &[2, 1, 2, 2, 0, 2, 1]);
        assert_eq!(sign, Sign::Plus);
        assert_eq!(basis.key_to_graph(&key).unwrap(), Some((wedge(), Sign::Plus)));
        // truncated edge list
        assert_eq!(basis.key_to_graph(&BasisKey::new(&[2, 1, 2, 2, 0])).unwrap(), None);
    }

    #[test]
    fn test_lazy_rejects_odd_automorphism() {
        let basis = FormalityGraphComplexBasisLazy::new(GraphCaches::in_memory(), None, None, None);
        // two aerial vertices swapped by an automorphism exchanging both edges
        let g = FormalityGraph::new(1, 2, vec![(1, 0), (2, 0)]).unwrap();
        assert_eq!(basis.graph_to_key(&g).unwrap(), None);
        assert_eq!(basis.key_to_graph(&BasisKey::new(&[1, 2, 2, 1, 0, 2, 0])).unwrap(), None);
    }

    #[test]
    fn test_operad_key_recovers_ground_order() {
        let basis = FormalityGraphOperadBasis::new(GraphCaches::in_memory(), None, None, None);
        let g = FormalityGraph::new(2, 1, vec![(2, 1), (2, 0)]).unwrap();
        let (key, sign) = basis.graph_to_key(&g).unwrap().unwrap();
        assert_eq!(key.len(), 4 + 3);
        let (back, back_sign) = basis.key_to_graph(&key).unwrap().unwrap();
        assert_eq!(back, wedge());
        assert_eq!(sign * back_sign, Sign::Minus);
    }
}

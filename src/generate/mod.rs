//! # Generator
//!
//! Produces every canonical graph of a given shape that passes a set of
//! filters, each exactly once. Raw enumeration comes from a
//! [`GraphEnumerationOracle`]; the generator canonicalizes the output,
//! places ground vertices for formality graphs and applies the filters the
//! oracle cannot express.

pub mod exhaustive;
pub mod options;

use std::sync::Arc;

use hashbrown::HashSet;
use itertools::Itertools;
use tracing::trace;

use crate::canon::{Canonicalizer, OracleGraph};
use crate::model::permutation::identity;
use crate::model::{DirectedGraph, Edge, FormalityGraph, Graph, UndirectedGraph};
use crate::{Error, Result};

pub use exhaustive::ExhaustiveEnumerator;
pub use options::{DirectedOptions, FormalityOptions, UndirectedOptions};

// ============================================================================
// Enumeration oracle contract
// ============================================================================

/// What to enumerate: all non-isomorphic graphs on `num_vertices` vertices
/// whose underlying simple graph has exactly `num_undirected_edges` edges.
///
/// With `num_directed_edges` set, the output is every orientation with that
/// many arcs; the surplus over the undirected count are 2-cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerationRequest {
    pub num_vertices: usize,
    pub num_undirected_edges: usize,
    pub num_directed_edges: Option<usize>,
    /// Underlying graph connected.
    pub connected: bool,
    /// Underlying graph biconnected.
    pub biconnected: bool,
    /// Minimum degree of the underlying graph.
    pub min_degree: usize,
    /// 2-cycles permitted.
    pub loops: bool,
    /// Exact maximum out-degree.
    pub max_out_degree: Option<usize>,
    /// Number of vertices attaining the maximum out-degree.
    pub num_verts_of_max_out_degree: Option<usize>,
    /// At least this many vertices of out-degree 0.
    pub min_sinks: usize,
}

impl EnumerationRequest {
    pub fn undirected(num_vertices: usize, num_edges: usize) -> Self {
        Self {
            num_vertices,
            num_undirected_edges: num_edges,
            num_directed_edges: None,
            connected: false,
            biconnected: false,
            min_degree: 0,
            loops: false,
            max_out_degree: None,
            num_verts_of_max_out_degree: None,
            min_sinks: 0,
        }
    }

    pub fn directed(
        num_vertices: usize,
        num_undirected_edges: usize,
        num_directed_edges: usize,
        loops: bool,
    ) -> Self {
        Self {
            num_undirected_edges,
            num_directed_edges: Some(num_directed_edges),
            loops,
            ..Self::undirected(num_vertices, num_undirected_edges)
        }
    }
}

/// Enumerates non-isomorphic graphs. Implementations may return any
/// labeling of each class, but must return each class once.
pub trait GraphEnumerationOracle: Send + Sync + 'static {
    fn enumerate(&self, request: &EnumerationRequest) -> Result<Vec<OracleGraph>>;
}

// ============================================================================
// Generator
// ============================================================================

#[derive(Clone)]
pub struct Generator {
    canonicalizer: Canonicalizer,
    enumerator: Arc<dyn GraphEnumerationOracle>,
}

impl Generator {
    pub fn new(canonicalizer: Canonicalizer, enumerator: Arc<dyn GraphEnumerationOracle>) -> Self {
        Self { canonicalizer, enumerator }
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    fn enumerate(&self, request: &EnumerationRequest) -> Result<Vec<OracleGraph>> {
        let graphs = self.enumerator.enumerate(request)?;
        let directed = request.num_directed_edges.is_some();
        let arcs = request.num_directed_edges.unwrap_or(request.num_undirected_edges);
        for g in &graphs {
            if g.directed != directed || g.num_vertices != request.num_vertices || g.edges.len() != arcs {
                return Err(Error::OracleFailure(format!(
                    "enumerator returned {g:?} for {request:?}"
                )));
            }
        }
        Ok(graphs)
    }

    fn keep_parity<G: Graph>(&self, graph: &G, wanted: Option<bool>) -> Result<bool> {
        match wanted {
            None => Ok(true),
            Some(odd) => Ok(self.canonicalizer.has_odd_automorphism(graph)? == odd),
        }
    }

    /// Canonical undirected graphs with `num_vertices` vertices and
    /// `num_edges` edges.
    pub fn undirected_graphs(
        &self,
        num_vertices: usize,
        num_edges: usize,
        options: &UndirectedOptions,
    ) -> Result<Vec<UndirectedGraph>> {
        let request = EnumerationRequest {
            connected: options.connected,
            biconnected: options.biconnected,
            min_degree: options.min_degree,
            ..EnumerationRequest::undirected(num_vertices, num_edges)
        };
        let mut seen = HashSet::new();
        let mut graphs = Vec::new();
        for raw in self.enumerate(&request)? {
            let g = UndirectedGraph::new(num_vertices, raw.edges).map_err(oracle_output)?;
            let g = self.canonicalizer.canonicalize(&g)?.graph;
            if !seen.insert(g.clone()) || !self.keep_parity(&g, options.has_odd_automorphism)? {
                continue;
            }
            graphs.push(g);
        }
        trace!(num_vertices, num_edges, count = graphs.len(), "undirected graphs generated");
        Ok(graphs)
    }

    /// Every orientation of `graph` with exactly `num_edges` arcs, up to
    /// isomorphism. Arcs beyond the edge count of `graph` are 2-cycles and
    /// need `loops`.
    pub fn orientations(
        &self,
        graph: &UndirectedGraph,
        num_edges: usize,
        loops: bool,
        has_odd_automorphism: Option<bool>,
    ) -> Result<Vec<DirectedGraph>> {
        let edges = graph.edges();
        let m = edges.len();
        let Some(doubled) = num_edges.checked_sub(m).filter(|&k| k <= m) else {
            return Ok(Vec::new());
        };
        if doubled > 0 && !loops {
            return Ok(Vec::new());
        }
        let mut seen = HashSet::new();
        let mut graphs = Vec::new();
        for pairs in (0..m).combinations(doubled) {
            let single: Vec<Edge> = (0..m).filter(|i| !pairs.contains(i)).map(|i| edges[i]).collect();
            for mask in orientation_masks(single.len())? {
                let mut arcs: Vec<Edge> = Vec::with_capacity(num_edges);
                for &i in &pairs {
                    let (a, b) = edges[i];
                    arcs.extend([(a, b), (b, a)]);
                }
                for (bit, &(a, b)) in single.iter().enumerate() {
                    arcs.push(if (mask >> bit) & 1 == 0 { (a, b) } else { (b, a) });
                }
                let h = DirectedGraph::new(graph.num_vertices(), arcs)?;
                let h = self.canonicalizer.canonicalize(&h)?.graph;
                if !seen.insert(h.clone()) || !self.keep_parity(&h, has_odd_automorphism)? {
                    continue;
                }
                graphs.push(h);
            }
        }
        Ok(graphs)
    }

    /// Coefficient of the canonical digraph `directed` in the sum of all
    /// single orientations of `graph`, each taken with its canonicalization
    /// sign. The edge order of `graph` is kept.
    pub fn orientation_coefficient(&self, graph: &UndirectedGraph, directed: &DirectedGraph) -> Result<i64> {
        let edges = graph.edges();
        if directed.num_edges() != edges.len() || directed.num_vertices() != graph.num_vertices() {
            return Ok(0);
        }
        let mut coefficient = 0;
        for mask in orientation_masks(edges.len())? {
            let arcs = edges
                .iter()
                .enumerate()
                .map(|(bit, &(a, b))| if (mask >> bit) & 1 == 0 { (a, b) } else { (b, a) })
                .collect();
            let canonical = self.canonicalizer.canonicalize(&DirectedGraph::new(graph.num_vertices(), arcs)?)?;
            if &canonical.graph == directed {
                coefficient += canonical.sign.as_i64();
            }
        }
        Ok(coefficient)
    }

    /// Canonical formality graphs with `num_ground` ground vertices (sinks),
    /// `num_aerial` aerial vertices and `num_edges` edges.
    pub fn formality_graphs(
        &self,
        num_ground: usize,
        num_aerial: usize,
        num_edges: usize,
        options: &FormalityOptions,
    ) -> Result<Vec<FormalityGraph>> {
        let n = num_ground + num_aerial;
        let max_loop_order = if options.allows_loops() { num_edges / 2 } else { 0 };
        let ground_permutations: Vec<Vec<usize>> = if options.mod_ground_permutations || num_ground == 0 {
            vec![identity(num_ground)]
        } else {
            (0..num_ground).permutations(num_ground).collect()
        };

        let mut graphs = Vec::new();
        for loop_order in 0..=max_loop_order {
            let request = EnumerationRequest {
                connected: options.connected == Some(true),
                max_out_degree: options.max_out_degree.filter(|&d| d > 0),
                num_verts_of_max_out_degree: options.num_verts_of_max_out_degree.filter(|&m| m > 0),
                min_sinks: num_ground,
                ..EnumerationRequest::directed(n, num_edges - loop_order, num_edges, options.allows_loops())
            };
            for raw in self.enumerate(&request)? {
                let h = DirectedGraph::new(n, raw.edges).map_err(oracle_output)?;
                let out_degrees = h.out_degrees();
                let in_degrees = h.in_degrees();
                if let Some(wanted) = &options.sorted_out_degrees {
                    let mut sorted = out_degrees.clone();
                    sorted.sort_unstable();
                    if &sorted != wanted {
                        continue;
                    }
                }
                let sinks: Vec<usize> = (0..n).filter(|&v| out_degrees[v] == 0).collect();
                let mut seen = HashSet::new();
                for chosen in sinks.into_iter().combinations(num_ground) {
                    let aerial: Vec<usize> = (0..n).filter(|v| !chosen.contains(v)).collect();
                    if options
                        .max_aerial_in_degree
                        .is_some_and(|max| aerial.iter().any(|&v| in_degrees[v] > max))
                    {
                        continue;
                    }
                    let mut relabeling = vec![0; n];
                    for (new, &old) in chosen.iter().chain(&aerial).enumerate() {
                        relabeling[old] = new;
                    }
                    let placed = FormalityGraph::new(num_ground, num_aerial, h.relabeled(&relabeling).edges().to_vec())?;
                    for perm in &ground_permutations {
                        let g = self.canonicalizer.canonicalize(&placed.ground_relabeled(perm))?.graph;
                        if !seen.insert(g.clone()) {
                            continue;
                        }
                        if options
                            .positive_differential_order
                            .is_some_and(|pdo| pdo != g.has_positive_differential_order())
                        {
                            continue;
                        }
                        if !self.keep_parity(&g, options.has_odd_automorphism)? {
                            continue;
                        }
                        if options.prime.is_some_and(|prime| prime != g.is_prime()) {
                            continue;
                        }
                        graphs.push(g);
                    }
                }
            }
        }
        trace!(num_ground, num_aerial, num_edges, count = graphs.len(), "formality graphs generated");
        Ok(graphs)
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(Canonicalizer::default(), Arc::new(ExhaustiveEnumerator::default()))
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator").field("canonicalizer", &self.canonicalizer).finish_non_exhaustive()
    }
}

/// Bit masks choosing a direction for each of `num_edges` edges.
pub(crate) fn orientation_masks(num_edges: usize) -> Result<std::ops::Range<u64>> {
    let end = u32::try_from(num_edges).ok().and_then(|bits| 1u64.checked_shl(bits)).ok_or_else(|| {
        Error::InvalidOptions(format!("cannot orient {num_edges} edges, at most 63 are supported"))
    })?;
    Ok(0..end)
}

fn oracle_output(err: Error) -> Error {
    Error::OracleFailure(format!("malformed enumerator output: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_orientation_masks_are_bounded() {
        assert_eq!(orientation_masks(3).unwrap(), 0..8);
        assert_eq!(orientation_masks(63).unwrap().end, 1 << 63);
        assert!(matches!(orientation_masks(64), Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_orienting_too_many_edges_fails() {
        let pairs: Vec<Edge> = (0..12).tuple_combinations().take(64).collect();
        let graph = UndirectedGraph::new(12, pairs.clone()).unwrap();
        let directed = DirectedGraph::new(12, pairs).unwrap();
        let err = Generator::default().orientation_coefficient(&graph, &directed).unwrap_err();
        assert!(matches!(err, Error::InvalidOptions(_)));
    }

    #[test]
    fn test_single_edge_list() {
        let generator = Generator::default();
        let graphs = generator.undirected_graphs(2, 1, &UndirectedOptions::even(false, false, 0)).unwrap();
        assert_eq!(graphs, vec![UndirectedGraph::new(2, vec![(0, 1)]).unwrap()]);
    }

    #[test]
    fn test_empty_graph() {
        let generator = Generator::default();
        let graphs = generator.undirected_graphs(0, 0, &UndirectedOptions::default()).unwrap();
        assert_eq!(graphs.len(), 1);
        let none = generator.undirected_graphs(2, 2, &UndirectedOptions::default()).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_even_filter_drops_triangle() {
        let generator = Generator::default();
        let all = generator.undirected_graphs(3, 3, &UndirectedOptions::default()).unwrap();
        let even = generator.undirected_graphs(3, 3, &UndirectedOptions::even(false, false, 0)).unwrap();
        assert_eq!(all.len(), 1);
        assert!(even.is_empty());
    }

    #[test]
    fn test_orientations_of_single_edge() {
        let generator = Generator::default();
        let edge = UndirectedGraph::new(2, vec![(0, 1)]).unwrap();
        assert_eq!(generator.orientations(&edge, 1, false, None).unwrap().len(), 1);
        // the 2-cycle
        assert_eq!(generator.orientations(&edge, 2, true, None).unwrap().len(), 1);
        assert!(generator.orientations(&edge, 2, true, Some(false)).unwrap().is_empty());
        assert!(generator.orientations(&edge, 2, false, None).unwrap().is_empty());
    }

    #[test]
    fn test_orientation_coefficient_of_single_edge() {
        let generator = Generator::default();
        let edge = UndirectedGraph::new(2, vec![(0, 1)]).unwrap();
        let arrow = DirectedGraph::new(2, vec![(0, 1)]).unwrap();
        let arrow = generator.canonicalizer().canonicalize(&arrow).unwrap().graph;
        // both orientations are isomorphic to the arrow with sign +1
        assert_eq!(generator.orientation_coefficient(&edge, &arrow).unwrap(), 2);
    }

    #[test]
    fn test_formality_wedge() {
        let generator = Generator::default();
        let options = FormalityOptions { has_odd_automorphism: Some(false), ..FormalityOptions::default() };
        let graphs = generator.formality_graphs(2, 1, 2, &options).unwrap();
        // one aerial vertex with an arrow to each ground vertex
        assert_eq!(graphs, vec![FormalityGraph::new(2, 1, vec![(2, 0), (2, 1)]).unwrap()]);
    }

    #[test]
    fn test_formality_without_sinks_is_empty() {
        let generator = Generator::default();
        // every vertex on a 2-cycle has an outgoing edge
        let graphs = generator.formality_graphs(1, 1, 2, &FormalityOptions::default()).unwrap();
        assert!(graphs.is_empty());
    }

    #[test]
    fn test_ground_permutations_distinguish_ground() {
        let generator = Generator::default();
        let options = FormalityOptions::default();
        // single arrow from the aerial vertex to ground 0 or to ground 1
        let all = generator.formality_graphs(2, 1, 1, &options).unwrap();
        assert_eq!(all.len(), 2);
        let modded = FormalityOptions { mod_ground_permutations: true, ..options };
        assert_eq!(generator.formality_graphs(2, 1, 1, &modded).unwrap().len(), 1);
    }
}

//! # Canonicalizer
//!
//! Reduces a labeled graph to the canonical representative of its
//! isomorphism class and reports the sign relating the two edge lists.
//!
//! The combinatorial work is delegated to a [`GraphIsomorphismOracle`].
//! The crate bundles [`RefinementOracle`]; anything that can produce a
//! partition-respecting canonical labeling (nauty bindings, bliss, ...) can
//! be plugged in instead.

pub mod refine;

use std::sync::Arc;

use crate::model::permutation::{inverse, is_permutation, selection_sort};
use crate::model::{Edge, FormalityGraph, Graph, Sign, VertexPartition};
use crate::{Error, Result};

pub use refine::RefinementOracle;

// ============================================================================
// Oracle contract
// ============================================================================

/// The graph handed to an oracle: a simple digraph (self-loops allowed) or
/// a simple undirected graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OracleGraph {
    pub num_vertices: usize,
    pub directed: bool,
    pub edges: Vec<Edge>,
}

impl OracleGraph {
    pub fn from_graph<G: Graph>(graph: &G) -> Self {
        Self {
            num_vertices: graph.num_vertices(),
            directed: G::DIRECTED,
            edges: graph.edges().to_vec(),
        }
    }
}

/// Canonical labeling and automorphisms, respecting a vertex partition.
pub trait GraphIsomorphismOracle: Send + Sync + 'static {
    /// Returns the canonically relabeled graph and `sigma`, where
    /// `sigma[v]` is the new label of `v`.
    fn canonical_label(
        &self,
        graph: &OracleGraph,
        partition: &VertexPartition,
    ) -> Result<(OracleGraph, Vec<usize>)>;

    /// Permutations generating the automorphism group; `perm[v]` is the
    /// image of `v`. The identity may be omitted.
    fn automorphism_group(
        &self,
        graph: &OracleGraph,
        partition: &VertexPartition,
    ) -> Result<Vec<Vec<usize>>>;
}

// ============================================================================
// Canonicalizer
// ============================================================================

/// Result of [`Canonicalizer::canonicalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonical<G> {
    /// Canonical representative with a sorted edge list.
    pub graph: G,
    /// `undo[sigma[v]] == v`: relabeling `graph` by `undo` recovers the input
    /// labeling.
    pub undo: Vec<usize>,
    /// Parity of the permutation taking the relabeled input edge list to the
    /// canonical edge list.
    pub sign: Sign,
}

#[derive(Clone)]
pub struct Canonicalizer {
    oracle: Arc<dyn GraphIsomorphismOracle>,
}

impl Canonicalizer {
    pub fn new(oracle: Arc<dyn GraphIsomorphismOracle>) -> Self {
        Self { oracle }
    }

    pub fn oracle(&self) -> &Arc<dyn GraphIsomorphismOracle> {
        &self.oracle
    }

    pub fn canonicalize<G: Graph>(&self, graph: &G) -> Result<Canonical<G>> {
        if graph.has_multi_edges() {
            return Err(Error::AmbiguousMultiEdge(format!("{graph:?}")));
        }
        let n = graph.num_vertices();
        let (canonical, sigma) =
            self.oracle.canonical_label(&OracleGraph::from_graph(graph), &graph.vertex_partition())?;
        if !is_permutation(&sigma, n) {
            return Err(Error::OracleFailure(format!(
                "canonical labeling {sigma:?} is not a permutation of 0..{n}"
            )));
        }

        let mut relabeled = graph.relabeled(&sigma);
        let sign = relabeled.canonicalize_edges();

        let mut expected = canonical.edges;
        selection_sort(&mut expected);
        if relabeled.edges() != expected.as_slice() {
            return Err(Error::OracleFailure(format!(
                "oracle returned {expected:?} but the labeling gives {:?}",
                relabeled.edges()
            )));
        }

        Ok(Canonical { graph: relabeled, undo: inverse(&sigma), sign })
    }

    /// Whether some partition-respecting automorphism permutes the edge list
    /// oddly. Such graphs vanish in skew-symmetric bases.
    pub fn has_odd_automorphism<G: Graph>(&self, graph: &G) -> Result<bool> {
        let n = graph.num_vertices();
        let edges = graph.edges();
        let generators = self
            .oracle
            .automorphism_group(&OracleGraph::from_graph(graph), &graph.vertex_partition())?;
        for perm in generators {
            if !is_permutation(&perm, n) {
                return Err(Error::OracleFailure(format!(
                    "automorphism {perm:?} is not a permutation of 0..{n}"
                )));
            }
            let mut index_permutation = Vec::with_capacity(edges.len());
            for edge in graph.relabeled(&perm).edges() {
                let index = edges.iter().position(|e| e == edge).ok_or_else(|| {
                    Error::OracleFailure(format!("{perm:?} is not an automorphism of {graph:?}"))
                })?;
                index_permutation.push(index);
            }
            if selection_sort(&mut index_permutation).is_negative() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether deleting the ground vertices leaves the graph connected.
    pub fn is_prime(&self, graph: &FormalityGraph) -> bool {
        graph.is_prime()
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(Arc::new(RefinementOracle::new()))
    }
}

impl std::fmt::Debug for Canonicalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canonicalizer").finish_non_exhaustive()
    }
}

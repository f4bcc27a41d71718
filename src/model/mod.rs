//! # Graph Model
//!
//! Plain graph values shared by every layer: canonicalizer, generator,
//! cache, basis and vector. Three flavors implement the common [`Graph`]
//! trait; the associated `Shape` is the grading tuple of the flavor.
//!
//! Design rule: this module is pure data: no caches, no oracles and no I/O.

pub mod permutation;
pub mod undirected;
pub mod directed;
pub mod formality;

use std::fmt;
use std::hash::Hash;

use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;
use serde::de::DeserializeOwned;
use smallvec::SmallVec;

use crate::Result;

pub use permutation::Sign;
pub use undirected::UndirectedGraph;
pub use directed::DirectedGraph;
pub use formality::FormalityGraph;

/// An edge as a pair of vertex indices.
pub type Edge = (usize, usize);

/// Edge storage. Graphs in a basis rarely exceed a handful of edges.
pub type EdgeList = SmallVec<[Edge; 8]>;

// ============================================================================
// Vertex partition
// ============================================================================

/// Ordered cells of vertices. Isomorphisms are required to map every cell
/// onto itself, and the cell order is part of the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexPartition {
    cells: Vec<Vec<usize>>,
}

impl VertexPartition {
    pub fn new(cells: Vec<Vec<usize>>) -> Self {
        Self { cells: cells.into_iter().filter(|c| !c.is_empty()).collect() }
    }

    /// All vertices interchangeable.
    pub fn trivial(num_vertices: usize) -> Self {
        Self::new(vec![(0..num_vertices).collect()])
    }

    /// Ground vertices individually fixed, aerial vertices one block.
    pub fn ground_aerial(num_ground: usize, num_aerial: usize) -> Self {
        let mut cells: Vec<Vec<usize>> = (0..num_ground).map(|v| vec![v]).collect();
        cells.push((num_ground..num_ground + num_aerial).collect());
        Self::new(cells)
    }

    pub fn cells(&self) -> &[Vec<usize>] {
        &self.cells
    }

    pub fn num_vertices(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }
}

// ============================================================================
// Graph trait
// ============================================================================

/// Behaviour shared by the undirected, directed and formality flavors.
pub trait Graph:
    Clone + Eq + Hash + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Grading tuple: `[vertices, edges]` or `[ground, aerial, edges]`.
    type Shape: Copy + Eq + Hash + Ord + fmt::Debug + AsRef<[usize]> + Send + Sync + 'static;

    /// Whether `(a, b)` and `(b, a)` are different edges.
    const DIRECTED: bool;

    fn num_vertices(&self) -> usize;

    fn edges(&self) -> &[Edge];

    fn shape(&self) -> Self::Shape;

    /// The cells an isomorphism of this flavor must preserve.
    fn vertex_partition(&self) -> VertexPartition;

    /// A graph of the same vertex shape carrying `edges`, validated.
    fn with_edges(&self, edges: Vec<Edge>) -> Result<Self>;

    /// Vertex `v` becomes `relabeling[v]`. The edge order is kept.
    fn relabeled(&self, relabeling: &[usize]) -> Self;

    /// Sort the edge list lexicographically and return the sign of the sort.
    fn canonicalize_edges(&mut self) -> Sign;

    /// Every graph obtained by substituting `other` into vertex `position`,
    /// one graph per way of reattaching the edges incident to `position`.
    fn insertion_graphs(&self, position: usize, other: &Self) -> Vec<Self>;

    fn num_edges(&self) -> usize {
        self.edges().len()
    }

    /// True if some (ordered, for directed flavors) vertex pair carries two edges.
    fn has_multi_edges(&self) -> bool {
        let mut sorted: Vec<Edge> = self.edges().to_vec();
        sorted.sort_unstable();
        sorted.windows(2).any(|w| w[0] == w[1])
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

pub(crate) fn check_edges(num_vertices: usize, edges: &[Edge]) -> Result<()> {
    for &(a, b) in edges {
        if a >= num_vertices || b >= num_vertices {
            return Err(crate::Error::InvalidGraphShape(format!(
                "edge ({a}, {b}) references a vertex outside 0..{num_vertices}"
            )));
        }
    }
    Ok(())
}

/// Build the underlying simple undirected petgraph of an edge list.
pub(crate) fn undirected_petgraph<I>(num_vertices: usize, edges: I) -> UnGraph<(), ()>
where
    I: IntoIterator<Item = Edge>,
{
    let mut g = UnGraph::<(), ()>::with_capacity(num_vertices, 0);
    for _ in 0..num_vertices {
        g.add_node(());
    }
    for (a, b) in edges {
        g.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
    }
    g
}

/// Connectivity of the underlying undirected graph. The empty graph and a
/// single vertex count as connected.
pub(crate) fn is_connected_undirected<I>(num_vertices: usize, edges: I) -> bool
where
    I: IntoIterator<Item = Edge>,
{
    if num_vertices <= 1 {
        return true;
    }
    petgraph::algo::connected_components(&undirected_petgraph(num_vertices, edges)) == 1
}

/// Connected, and for three or more vertices without a cut vertex.
pub(crate) fn is_biconnected_undirected(num_vertices: usize, edges: &[Edge]) -> bool {
    if !is_connected_undirected(num_vertices, edges.iter().copied()) {
        return false;
    }
    if num_vertices < 3 {
        return true;
    }
    (0..num_vertices).all(|cut| {
        let rest = edges
            .iter()
            .filter(|&&(a, b)| a != cut && b != cut)
            .map(|&(a, b)| (a - usize::from(a > cut), b - usize::from(b > cut)));
        is_connected_undirected(num_vertices - 1, rest)
    })
}

/// Cartesian product of per-edge choices: one edge list per combination.
pub(crate) fn expand_choices(choices: Vec<Vec<Edge>>) -> Vec<Vec<Edge>> {
    choices.into_iter().fold(vec![Vec::new()], |acc, options| {
        let mut next = Vec::with_capacity(acc.len() * options.len());
        for prefix in &acc {
            for &edge in &options {
                let mut edges = prefix.clone();
                edges.push(edge);
                next.push(edges);
            }
        }
        next
    })
}

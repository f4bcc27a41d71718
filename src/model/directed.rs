//! Directed graph with an ordered edge list.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::permutation::selection_sort;
use super::{
    Edge, EdgeList, Graph, Sign, UndirectedGraph, VertexPartition, check_edges, expand_choices,
    is_connected_undirected,
};
use crate::Result;

/// Directed graph on vertices `0..n`; edges are `(source, target)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectedGraph {
    num_vertices: usize,
    edges: EdgeList,
}

impl DirectedGraph {
    pub fn new(num_vertices: usize, edges: Vec<Edge>) -> Result<Self> {
        check_edges(num_vertices, &edges)?;
        Ok(Self { num_vertices, edges: edges.into_iter().collect() })
    }

    pub fn out_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.num_vertices];
        for &(a, _) in &self.edges {
            degrees[a] += 1;
        }
        degrees
    }

    pub fn in_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.num_vertices];
        for &(_, b) in &self.edges {
            degrees[b] += 1;
        }
        degrees
    }

    /// Weak connectivity.
    pub fn is_connected(&self) -> bool {
        is_connected_undirected(self.num_vertices, self.edges.iter().copied())
    }

    /// Forget orientations. A 2-cycle collapses to a single edge.
    pub fn underlying(&self) -> Result<UndirectedGraph> {
        let mut edges: Vec<Edge> =
            self.edges.iter().map(|&(a, b)| if a <= b { (a, b) } else { (b, a) }).collect();
        edges.sort_unstable();
        edges.dedup();
        UndirectedGraph::new(self.num_vertices, edges)
    }
}

impl Graph for DirectedGraph {
    type Shape = [usize; 2];

    const DIRECTED: bool = true;

    fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn shape(&self) -> [usize; 2] {
        [self.num_vertices, self.edges.len()]
    }

    fn vertex_partition(&self) -> VertexPartition {
        VertexPartition::trivial(self.num_vertices)
    }

    fn with_edges(&self, edges: Vec<Edge>) -> Result<Self> {
        Self::new(self.num_vertices, edges)
    }

    fn relabeled(&self, relabeling: &[usize]) -> Self {
        Self {
            num_vertices: self.num_vertices,
            edges: self.edges.iter().map(|&(a, b)| (relabeling[a], relabeling[b])).collect(),
        }
    }

    fn canonicalize_edges(&mut self) -> Sign {
        selection_sort(&mut self.edges)
    }

    fn insertion_graphs(&self, position: usize, other: &Self) -> Vec<Self> {
        if position >= self.num_vertices {
            return Vec::new();
        }
        let n2 = other.num_vertices;
        let ends = |v: usize| -> Vec<usize> {
            if v == position {
                (position..position + n2).collect()
            } else if v < position {
                vec![v]
            } else {
                vec![v + n2 - 1]
            }
        };
        let choices: Vec<Vec<Edge>> = self
            .edges
            .iter()
            .map(|&(a, b)| {
                let targets = ends(b);
                ends(a)
                    .into_iter()
                    .flat_map(|x| targets.iter().map(move |&y| (x, y)))
                    .collect()
            })
            .collect();
        let inserted: Vec<Edge> = other.edges.iter().map(|&(a, b)| (a + position, b + position)).collect();
        expand_choices(choices)
            .into_iter()
            .map(|mut edges| {
                edges.extend_from_slice(&inserted);
                Self { num_vertices: self.num_vertices + n2 - 1, edges: edges.into_iter().collect() }
            })
            .collect()
    }
}

impl fmt::Display for DirectedGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirectedGraph({}, {:?})", self.num_vertices, self.edges.as_slice())
    }
}

//! Undirected graph with an ordered edge list.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::permutation::selection_sort;
use super::{
    Edge, EdgeList, Graph, Sign, VertexPartition, check_edges, expand_choices,
    is_biconnected_undirected, is_connected_undirected,
};
use crate::Result;

/// Undirected graph on vertices `0..n`. Each edge is stored as
/// `(low, high)`; the order of the edge list is significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UndirectedGraph {
    num_vertices: usize,
    edges: EdgeList,
}

impl UndirectedGraph {
    pub fn new(num_vertices: usize, edges: Vec<Edge>) -> Result<Self> {
        check_edges(num_vertices, &edges)?;
        Ok(Self {
            num_vertices,
            edges: edges.into_iter().map(normalize).collect(),
        })
    }

    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.num_vertices];
        for &(a, b) in &self.edges {
            degrees[a] += 1;
            degrees[b] += 1;
        }
        degrees
    }

    pub fn is_connected(&self) -> bool {
        is_connected_undirected(self.num_vertices, self.edges.iter().copied())
    }

    pub fn is_biconnected(&self) -> bool {
        is_biconnected_undirected(self.num_vertices, &self.edges)
    }
}

fn normalize((a, b): Edge) -> Edge {
    if a <= b { (a, b) } else { (b, a) }
}

impl Graph for UndirectedGraph {
    type Shape = [usize; 2];

    const DIRECTED: bool = false;

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
            edges: self
                .edges
                .iter()
                .map(|&(a, b)| normalize((relabeling[a], relabeling[b])))
                .collect(),
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
        let host = |v: usize| if v < position { v } else { v + n2 - 1 };
        let choices: Vec<Vec<Edge>> = self
            .edges
            .iter()
            .map(|&(a, b)| {
                let ends = |v: usize| -> Vec<usize> {
                    if v == position { (position..position + n2).collect() } else { vec![host(v)] }
                };
                let mut options = Vec::new();
                for x in ends(a) {
                    for y in ends(b) {
                        options.push((x, y));
                    }
                }
                options
            })
            .collect();
        let inserted: Vec<Edge> = other.edges.iter().map(|&(a, b)| (a + position, b + position)).collect();
        expand_choices(choices)
            .into_iter()
            .map(|mut edges| {
                edges.extend_from_slice(&inserted);
                Self {
                    num_vertices: self.num_vertices + n2 - 1,
                    edges: edges.into_iter().map(normalize).collect(),
                }
            })
            .collect()
    }
}

impl fmt::Display for UndirectedGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UndirectedGraph({}, {:?})", self.num_vertices, self.edges.as_slice())
    }
}

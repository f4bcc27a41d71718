//! Formality graphs: directed graphs with `gv` ground vertices followed by
//! `av` aerial vertices.
//!
//! Ground vertices are labeled individually (they stand for the arguments of
//! a polydifferential operator); aerial vertices are interchangeable. Edges
//! are directed and ordered.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::permutation::selection_sort;
use super::{
    Edge, EdgeList, Graph, Sign, VertexPartition, check_edges, expand_choices,
    is_connected_undirected,
};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormalityGraph {
    num_ground: usize,
    num_aerial: usize,
    edges: EdgeList,
}

impl FormalityGraph {
    pub fn new(num_ground: usize, num_aerial: usize, edges: Vec<Edge>) -> Result<Self> {
        check_edges(num_ground + num_aerial, &edges)?;
        Ok(Self { num_ground, num_aerial, edges: edges.into_iter().collect() })
    }

    pub fn num_ground_vertices(&self) -> usize {
        self.num_ground
    }

    pub fn num_aerial_vertices(&self) -> usize {
        self.num_aerial
    }

    pub fn out_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.num_vertices()];
        for &(a, _) in &self.edges {
            degrees[a] += 1;
        }
        degrees
    }

    pub fn in_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.num_vertices()];
        for &(_, b) in &self.edges {
            degrees[b] += 1;
        }
        degrees
    }

    /// In-degrees of the ground vertices: the order of the derivative
    /// falling on each argument.
    pub fn differential_orders(&self) -> Vec<usize> {
        let mut orders = self.in_degrees();
        orders.truncate(self.num_ground);
        orders
    }

    pub fn has_positive_differential_order(&self) -> bool {
        !self.differential_orders().contains(&0)
    }

    pub fn is_connected(&self) -> bool {
        is_connected_undirected(self.num_vertices(), self.edges.iter().copied())
    }

    /// Whether deleting the ground vertices leaves a connected graph.
    pub fn is_prime(&self) -> bool {
        let g = self.num_ground;
        let aerial_edges = self
            .edges
            .iter()
            .filter(|&&(a, b)| a >= g && b >= g)
            .map(|&(a, b)| (a - g, b - g));
        is_connected_undirected(self.num_aerial, aerial_edges)
    }

    /// A 2-cycle between two aerial vertices that both point at the same
    /// ground vertex.
    pub fn has_eye_on_ground(&self) -> bool {
        let g = self.num_ground;
        let has = |a: usize, b: usize| self.edges.contains(&(a, b));
        self.edges.iter().any(|&(a, b)| {
            a >= g && b >= g && a < b && has(b, a) && (0..g).any(|ground| has(a, ground) && has(b, ground))
        })
    }

    /// Disjoint union of the aerial parts with the ground vertices
    /// identified. Edges of `self` come first.
    pub fn aerial_product(&self, other: &Self) -> Result<Self> {
        if self.num_ground != other.num_ground {
            return Err(crate::Error::InvalidGraphShape(format!(
                "aerial product needs equal ground vertex counts, got {} and {}",
                self.num_ground, other.num_ground
            )));
        }
        let g = self.num_ground;
        let shift = |v: usize| if v < g { v } else { v + self.num_aerial };
        let mut edges: Vec<Edge> = self.edges.to_vec();
        edges.extend(other.edges.iter().map(|&(a, b)| (shift(a), shift(b))));
        Self::new(g, self.num_aerial + other.num_aerial, edges)
    }

    /// Permute the ground vertices only: ground `v` becomes `ground_perm[v]`.
    pub fn ground_relabeled(&self, ground_perm: &[usize]) -> Self {
        let relabeling: Vec<usize> = ground_perm
            .iter()
            .copied()
            .chain(self.num_ground..self.num_vertices())
            .collect();
        self.relabeled(&relabeling)
    }
}

impl Graph for FormalityGraph {
    type Shape = [usize; 3];

    const DIRECTED: bool = true;

    fn num_vertices(&self) -> usize {
        self.num_ground + self.num_aerial
    }

    fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn shape(&self) -> [usize; 3] {
        [self.num_ground, self.num_aerial, self.edges.len()]
    }

    fn vertex_partition(&self) -> VertexPartition {
        VertexPartition::ground_aerial(self.num_ground, self.num_aerial)
    }

    fn with_edges(&self, edges: Vec<Edge>) -> Result<Self> {
        Self::new(self.num_ground, self.num_aerial, edges)
    }

    fn relabeled(&self, relabeling: &[usize]) -> Self {
        Self {
            num_ground: self.num_ground,
            num_aerial: self.num_aerial,
            edges: self.edges.iter().map(|&(a, b)| (relabeling[a], relabeling[b])).collect(),
        }
    }

    fn canonicalize_edges(&mut self) -> Sign {
        selection_sort(&mut self.edges)
    }

    /// Insert `other` into the ground vertex `position`. The ground
    /// vertices of `other` take the labels `position..position + gv2`, the
    /// aerial vertices of `other` follow those of `self`. Edges landing on
    /// `position` are redistributed over all vertices of `other` (Leibniz
    /// rule).
    fn insertion_graphs(&self, position: usize, other: &Self) -> Vec<Self> {
        if position >= self.num_ground {
            return Vec::new();
        }
        let (g1, a1) = (self.num_ground, self.num_aerial);
        let (g2, a2) = (other.num_ground, other.num_aerial);
        let ground = g1 + g2 - 1;
        let host = |v: usize| {
            if v < position {
                v
            } else if v < g1 {
                v + g2 - 1
            } else {
                ground + (v - g1)
            }
        };
        let guest = |w: usize| if w < g2 { position + w } else { ground + a1 + (w - g2) };
        let guest_vertices: Vec<usize> = (0..g2 + a2).map(guest).collect();
        let ends = |v: usize| -> Vec<usize> {
            if v == position { guest_vertices.clone() } else { vec![host(v)] }
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
        let inserted: Vec<Edge> = other.edges.iter().map(|&(a, b)| (guest(a), guest(b))).collect();
        expand_choices(choices)
            .into_iter()
            .map(|mut edges| {
                edges.extend_from_slice(&inserted);
                Self { num_ground: ground, num_aerial: a1 + a2, edges: edges.into_iter().collect() }
            })
            .collect()
    }
}

impl fmt::Display for FormalityGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FormalityGraph({}, {}, {:?})",
            self.num_ground,
            self.num_aerial,
            self.edges.as_slice()
        )
    }
}

//! Exhaustive enumeration of non-isomorphic (di)graphs.
//!
//! Walks every edge subset of the complete graph, keeps one representative
//! per canonical form, then expands the survivors into orientations. Fine
//! for the handful of vertices graph complexes live on; anything larger
//! wants a real generator behind [`GraphEnumerationOracle`].

use std::sync::Arc;

use hashbrown::HashSet;
use itertools::Itertools;
use tracing::trace;

use super::{EnumerationRequest, GraphEnumerationOracle, orientation_masks};
use crate::Result;
use crate::canon::{GraphIsomorphismOracle, OracleGraph, RefinementOracle};
use crate::model::{Edge, VertexPartition, is_biconnected_undirected, is_connected_undirected};

#[derive(Clone)]
pub struct ExhaustiveEnumerator {
    oracle: Arc<dyn GraphIsomorphismOracle>,
}

impl ExhaustiveEnumerator {
    pub fn new(oracle: Arc<dyn GraphIsomorphismOracle>) -> Self {
        Self { oracle }
    }

    fn certificate(&self, graph: &OracleGraph) -> Result<Vec<Edge>> {
        let partition = VertexPartition::trivial(graph.num_vertices);
        Ok(self.oracle.canonical_label(graph, &partition)?.0.edges)
    }

    fn simple_graphs(&self, request: &EnumerationRequest) -> Result<Vec<Vec<Edge>>> {
        let n = request.num_vertices;
        let pairs: Vec<Edge> = (0..n).tuple_combinations().collect();
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for subset in pairs.into_iter().combinations(request.num_undirected_edges) {
            if !request.admits_underlying(&subset) {
                continue;
            }
            let graph = OracleGraph { num_vertices: n, directed: false, edges: subset };
            let certificate = self.certificate(&graph)?;
            if seen.insert(certificate.clone()) {
                found.push(certificate);
            }
        }
        trace!(vertices = n, edges = request.num_undirected_edges, count = found.len(), "simple graphs");
        Ok(found)
    }

    fn orientations(
        &self,
        request: &EnumerationRequest,
        underlying: &[Vec<Edge>],
        num_directed: usize,
    ) -> Result<Vec<OracleGraph>> {
        let m = request.num_undirected_edges;
        let Some(doubled) = num_directed.checked_sub(m).filter(|&k| k <= m) else {
            return Ok(Vec::new());
        };
        if doubled > 0 && !request.loops {
            return Ok(Vec::new());
        }
        let n = request.num_vertices;
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for edges in underlying {
            for pairs in (0..m).combinations(doubled) {
                let single: Vec<Edge> =
                    (0..m).filter(|i| !pairs.contains(i)).map(|i| edges[i]).collect();
                for mask in orientation_masks(single.len())? {
                    let mut arcs: Vec<Edge> = Vec::with_capacity(num_directed);
                    for &i in &pairs {
                        let (a, b) = edges[i];
                        arcs.push((a, b));
                        arcs.push((b, a));
                    }
                    for (bit, &(a, b)) in single.iter().enumerate() {
                        arcs.push(if (mask >> bit) & 1 == 0 { (a, b) } else { (b, a) });
                    }
                    if !request.admits_out_degrees(&arcs) {
                        continue;
                    }
                    let graph = OracleGraph { num_vertices: n, directed: true, edges: arcs };
                    let certificate = self.certificate(&graph)?;
                    if seen.insert(certificate.clone()) {
                        found.push(OracleGraph { num_vertices: n, directed: true, edges: certificate });
                    }
                }
            }
        }
        trace!(vertices = n, arcs = num_directed, count = found.len(), "orientations");
        Ok(found)
    }
}

impl Default for ExhaustiveEnumerator {
    fn default() -> Self {
        Self::new(Arc::new(RefinementOracle::new()))
    }
}

impl GraphEnumerationOracle for ExhaustiveEnumerator {
    fn enumerate(&self, request: &EnumerationRequest) -> Result<Vec<OracleGraph>> {
        let n = request.num_vertices;
        if request.num_undirected_edges > n * n.saturating_sub(1) / 2 {
            return Ok(Vec::new());
        }
        let underlying = self.simple_graphs(request)?;
        match request.num_directed_edges {
            None => Ok(underlying
                .into_iter()
                .map(|edges| OracleGraph { num_vertices: n, directed: false, edges })
                .collect()),
            Some(arcs) => self.orientations(request, &underlying, arcs),
        }
    }
}

impl EnumerationRequest {
    fn admits_underlying(&self, edges: &[Edge]) -> bool {
        let n = self.num_vertices;
        if self.connected && !is_connected_undirected(n, edges.iter().copied()) {
            return false;
        }
        if self.biconnected && !is_biconnected_undirected(n, edges) {
            return false;
        }
        if self.min_degree > 0 {
            let mut degrees = vec![0; n];
            for &(a, b) in edges {
                degrees[a] += 1;
                degrees[b] += 1;
            }
            if degrees.iter().any(|&d| d < self.min_degree) {
                return false;
            }
        }
        true
    }

    fn admits_out_degrees(&self, arcs: &[Edge]) -> bool {
        let mut out = vec![0; self.num_vertices];
        for &(a, _) in arcs {
            out[a] += 1;
        }
        if out.iter().filter(|&&d| d == 0).count() < self.min_sinks {
            return false;
        }
        let max = out.iter().copied().max().unwrap_or(0);
        if self.max_out_degree.is_some_and(|d| d != max) {
            return false;
        }
        self.num_verts_of_max_out_degree
            .is_none_or(|count| out.iter().filter(|&&d| d == max).count() == count)
    }
}

//! Individualization–refinement canonical labeling.
//!
//! Automorphisms are collected whenever a leaf repeats the certificate of
//! the first or the best leaf. A child of a search node is skipped when an
//! automorphism fixing the node's individualized vertices maps it onto a
//! child already explored, so symmetric graphs such as `K_n` or the empty
//! graph stay at polynomially many leaves rather than `n!`.

use std::cmp::Ordering;

use tracing::trace;

use super::{GraphIsomorphismOracle, OracleGraph};
use crate::model::permutation::inverse;
use crate::model::{Edge, VertexPartition};
use crate::{Error, Result};

/// The bundled [`GraphIsomorphismOracle`].
///
/// The canonical labeling is the first search-tree leaf with the smallest
/// sorted relabeled edge list. A graph that is already canonical is labeled
/// by the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefinementOracle;

impl RefinementOracle {
    pub fn new() -> Self {
        Self
    }
}

impl GraphIsomorphismOracle for RefinementOracle {
    fn canonical_label(
        &self,
        graph: &OracleGraph,
        partition: &VertexPartition,
    ) -> Result<(OracleGraph, Vec<usize>)> {
        let leaves = search(graph, partition)?;
        let identity: Vec<usize> = (0..graph.num_vertices).collect();
        let labeling = if certificate(graph, &identity) == leaves.certificate {
            identity
        } else {
            leaves.best
        };
        let canonical = OracleGraph {
            num_vertices: graph.num_vertices,
            directed: graph.directed,
            edges: leaves.certificate,
        };
        Ok((canonical, labeling))
    }

    fn automorphism_group(
        &self,
        graph: &OracleGraph,
        partition: &VertexPartition,
    ) -> Result<Vec<Vec<usize>>> {
        Ok(search(graph, partition)?.generators)
    }
}

// ============================================================================
// Search
// ============================================================================

struct Adjacency {
    out: Vec<Vec<usize>>,
    inc: Vec<Vec<usize>>,
    looped: Vec<bool>,
}

impl Adjacency {
    fn new(graph: &OracleGraph) -> Self {
        let n = graph.num_vertices;
        let mut out = vec![Vec::new(); n];
        let mut inc = vec![Vec::new(); n];
        let mut looped = vec![false; n];
        for &(a, b) in &graph.edges {
            if a == b {
                looped[a] = true;
                continue;
            }
            out[a].push(b);
            inc[b].push(a);
            if !graph.directed {
                out[b].push(a);
                inc[a].push(b);
            }
        }
        Self { out, inc, looped }
    }
}

/// Outcome of the search: the first leaf with the smallest certificate and
/// generators of the automorphism group.
struct BestLeaves {
    certificate: Vec<Edge>,
    best: Vec<usize>,
    generators: Vec<Vec<usize>>,
}

fn search(graph: &OracleGraph, partition: &VertexPartition) -> Result<BestLeaves> {
    validate(graph, partition)?;
    let adjacency = Adjacency::new(graph);

    let mut cells: Vec<Vec<usize>> = Vec::with_capacity(partition.cells().len());
    for cell in partition.cells() {
        let (looped, plain): (Vec<usize>, Vec<usize>) =
            cell.iter().partition(|&&v| adjacency.looped[v]);
        for mut part in [plain, looped] {
            if !part.is_empty() {
                part.sort_unstable();
                cells.push(part);
            }
        }
    }

    let mut walk = Walk {
        graph,
        adjacency: &adjacency,
        first: None,
        best: None,
        generators: Vec::new(),
        leaves: 0,
    };
    walk.descend(cells, &mut Vec::new());
    trace!(
        vertices = graph.num_vertices,
        leaves = walk.leaves,
        generators = walk.generators.len(),
        "refinement search done"
    );
    let (certificate, best) = walk
        .best
        .ok_or_else(|| Error::OracleFailure("refinement search produced no leaf".into()))?;
    Ok(BestLeaves { certificate, best, generators: walk.generators })
}

fn validate(graph: &OracleGraph, partition: &VertexPartition) -> Result<()> {
    let n = graph.num_vertices;
    let mut seen = vec![false; n];
    for &v in partition.cells().iter().flatten() {
        if v >= n || seen[v] {
            return Err(Error::OracleFailure(format!(
                "partition is not a partition of 0..{n}"
            )));
        }
        seen[v] = true;
    }
    if seen.iter().any(|s| !s) {
        return Err(Error::OracleFailure(format!("partition does not cover 0..{n}")));
    }
    if graph.edges.iter().any(|&(a, b)| a >= n || b >= n) {
        return Err(Error::OracleFailure("edge endpoint out of range".into()));
    }
    Ok(())
}

/// A leaf: its certificate and the labeling producing it.
type Leaf = (Vec<Edge>, Vec<usize>);

struct Walk<'a> {
    graph: &'a OracleGraph,
    adjacency: &'a Adjacency,
    first: Option<Leaf>,
    best: Option<Leaf>,
    generators: Vec<Vec<usize>>,
    leaves: usize,
}

impl Walk<'_> {
    /// `prefix` holds the vertices individualized on the way to `cells`.
    fn descend(&mut self, cells: Vec<Vec<usize>>, prefix: &mut Vec<usize>) {
        let cells = refine(self.adjacency, cells);
        let Some(target) = cells.iter().position(|c| c.len() > 1) else {
            self.leaf(&cells);
            return;
        };
        let mut explored: Vec<usize> = Vec::new();
        for &v in &cells[target] {
            if self.equivalent_to_explored(prefix, &explored, v) {
                continue;
            }
            explored.push(v);
            let mut child = Vec::with_capacity(cells.len() + 1);
            child.extend_from_slice(&cells[..target]);
            child.push(vec![v]);
            child.push(cells[target].iter().copied().filter(|&w| w != v).collect());
            child.extend_from_slice(&cells[target + 1..]);
            prefix.push(v);
            self.descend(child, prefix);
            prefix.pop();
        }
    }

    /// Whether the automorphisms found so far that fix `prefix` pointwise
    /// map `v` onto one of the `explored` vertices.
    fn equivalent_to_explored(&self, prefix: &[usize], explored: &[usize], v: usize) -> bool {
        if explored.is_empty() {
            return false;
        }
        let mut orbits = Orbits::new(self.graph.num_vertices);
        for generator in &self.generators {
            if prefix.iter().all(|&p| generator[p] == p) {
                orbits.absorb(generator);
            }
        }
        let root = orbits.find(v);
        explored.iter().any(|&w| orbits.find(w) == root)
    }

    fn leaf(&mut self, cells: &[Vec<usize>]) {
        self.leaves += 1;
        let mut labeling = vec![0; self.graph.num_vertices];
        for (label, cell) in cells.iter().enumerate() {
            labeling[cell[0]] = label;
        }
        let certificate = certificate(self.graph, &labeling);

        let Some((first_certificate, first_labeling)) = &self.first else {
            self.first = Some((certificate.clone(), labeling.clone()));
            self.best = Some((certificate, labeling));
            return;
        };
        let mut found = Vec::with_capacity(2);
        if &certificate == first_certificate {
            found.push(automorphism(first_labeling, &labeling));
        }
        let ordering = self.best.as_ref().map(|(best_certificate, _)| certificate.cmp(best_certificate));
        match ordering {
            None | Some(Ordering::Less) => self.best = Some((certificate, labeling)),
            Some(Ordering::Equal) => {
                if let Some((_, best_labeling)) = &self.best {
                    found.push(automorphism(best_labeling, &labeling));
                }
            }
            Some(Ordering::Greater) => {}
        }
        for generator in found {
            let trivial = generator.iter().enumerate().all(|(v, &w)| v == w);
            if !trivial && !self.generators.contains(&generator) {
                self.generators.push(generator);
            }
        }
    }
}

/// The automorphism `alpha` with `from[alpha[v]] == to[v]`, for two
/// labelings producing the same certificate.
fn automorphism(from: &[usize], to: &[usize]) -> Vec<usize> {
    let back = inverse(from);
    to.iter().map(|&label| back[label]).collect()
}

/// Union-find over vertices, merged along permutation cycles.
struct Orbits {
    parent: Vec<usize>,
}

impl Orbits {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, mut v: usize) -> usize {
        while self.parent[v] != v {
            self.parent[v] = self.parent[self.parent[v]];
            v = self.parent[v];
        }
        v
    }

    fn absorb(&mut self, permutation: &[usize]) {
        for (v, &w) in permutation.iter().enumerate() {
            let (a, b) = (self.find(v), self.find(w));
            if a != b {
                self.parent[a] = b;
            }
        }
    }
}

/// Sorted edge list of the graph relabeled by `labeling`.
fn certificate(graph: &OracleGraph, labeling: &[usize]) -> Vec<Edge> {
    let mut edges: Vec<Edge> = graph
        .edges
        .iter()
        .map(|&(a, b)| {
            let (x, y) = (labeling[a], labeling[b]);
            if graph.directed || x <= y { (x, y) } else { (y, x) }
        })
        .collect();
    edges.sort_unstable();
    edges
}

/// Split cells by neighbour counts into every cell until nothing splits.
/// Subcells are ordered by their signature, which keeps the result
/// independent of the input labeling.
fn refine(adjacency: &Adjacency, mut cells: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    let n = adjacency.out.len();
    loop {
        let mut cell_of = vec![0; n];
        for (i, cell) in cells.iter().enumerate() {
            for &v in cell {
                cell_of[v] = i;
            }
        }
        let k = cells.len();
        let mut next = Vec::with_capacity(k);
        for cell in &cells {
            if cell.len() == 1 {
                next.push(cell.clone());
                continue;
            }
            let mut keyed: Vec<(Vec<(usize, usize)>, usize)> = cell
                .iter()
                .map(|&v| {
                    let mut signature = vec![(0, 0); k];
                    for &w in &adjacency.out[v] {
                        signature[cell_of[w]].0 += 1;
                    }
                    for &w in &adjacency.inc[v] {
                        signature[cell_of[w]].1 += 1;
                    }
                    (signature, v)
                })
                .collect();
            keyed.sort_unstable();
            for group in keyed.chunk_by(|x, y| x.0 == y.0) {
                next.push(group.iter().map(|(_, v)| *v).collect());
            }
        }
        if next.len() == cells.len() {
            return next;
        }
        cells = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::permutation::is_permutation;
    use hashbrown::HashSet;

    fn oracle_graph(n: usize, directed: bool, edges: &[Edge]) -> OracleGraph {
        OracleGraph { num_vertices: n, directed, edges: edges.to_vec() }
    }

    #[test]
    fn test_refine_splits_by_degree() {
        // star: center has degree 3
        let g = oracle_graph(4, false, &[(0, 3), (1, 3), (2, 3)]);
        let cells = refine(&Adjacency::new(&g), vec![vec![0, 1, 2, 3]]);
        assert_eq!(cells, vec![vec![0, 1, 2], vec![3]]);
    }

    #[test]
    fn test_isomorphic_graphs_get_same_certificate() {
        let oracle = RefinementOracle::new();
        let p = VertexPartition::trivial(4);
        let a = oracle_graph(4, false, &[(0, 1), (1, 2), (2, 3)]);
        let b = oracle_graph(4, false, &[(2, 0), (0, 3), (3, 1)]);
        let (ca, sa) = oracle.canonical_label(&a, &p).unwrap();
        let (cb, sb) = oracle.canonical_label(&b, &p).unwrap();
        assert_eq!(ca, cb);
        assert!(is_permutation(&sa, 4) && is_permutation(&sb, 4));
    }

    #[test]
    fn test_canonical_input_gets_identity() {
        let oracle = RefinementOracle::new();
        let p = VertexPartition::trivial(4);
        let g = oracle_graph(4, true, &[(3, 0), (0, 1), (1, 2)]);
        let (c, _) = oracle.canonical_label(&g, &p).unwrap();
        let (again, sigma) = oracle.canonical_label(&c, &p).unwrap();
        assert_eq!(again, c);
        assert_eq!(sigma, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_partition_is_respected() {
        let oracle = RefinementOracle::new();
        // ground 0 and 1 fixed: the wedge pointing at 0 differs from the one at 1
        let p = VertexPartition::ground_aerial(2, 1);
        let at0 = oracle_graph(3, true, &[(2, 0)]);
        let at1 = oracle_graph(3, true, &[(2, 1)]);
        let (c0, s0) = oracle.canonical_label(&at0, &p).unwrap();
        let (c1, _) = oracle.canonical_label(&at1, &p).unwrap();
        assert_ne!(c0, c1);
        assert_eq!(&s0[..2], &[0, 1]);
    }

    /// Every product of the generators, identity included.
    fn closure(n: usize, generators: &[Vec<usize>]) -> HashSet<Vec<usize>> {
        let mut group: HashSet<Vec<usize>> = HashSet::from([(0..n).collect()]);
        let mut frontier: Vec<Vec<usize>> = group.iter().cloned().collect();
        while let Some(element) = frontier.pop() {
            for generator in generators {
                let product: Vec<usize> = element.iter().map(|&v| generator[v]).collect();
                if group.insert(product.clone()) {
                    frontier.push(product);
                }
            }
        }
        group
    }

    fn is_automorphism(graph: &OracleGraph, perm: &[usize]) -> bool {
        let identity: Vec<usize> = (0..graph.num_vertices).collect();
        certificate(graph, perm) == certificate(graph, &identity)
    }

    #[test]
    fn test_automorphisms_of_triangle() {
        let oracle = RefinementOracle::new();
        let g = oracle_graph(3, false, &[(0, 1), (1, 2), (0, 2)]);
        let generators = oracle.automorphism_group(&g, &VertexPartition::trivial(3)).unwrap();
        assert!(generators.iter().all(|perm| is_automorphism(&g, perm)));
        // the generators recover all of S3
        assert_eq!(closure(3, &generators).len(), 6);
    }

    #[test]
    fn test_automorphisms_of_directed_cycle() {
        let oracle = RefinementOracle::new();
        let g = oracle_graph(4, true, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let generators = oracle.automorphism_group(&g, &VertexPartition::trivial(4)).unwrap();
        assert!(generators.iter().all(|perm| is_automorphism(&g, perm)));
        assert_eq!(closure(4, &generators).len(), 4);
    }

    #[test]
    fn test_symmetric_graphs_are_pruned() {
        let oracle = RefinementOracle::new();
        // 12! leaves without pruning
        let empty = oracle_graph(12, false, &[]);
        let p = VertexPartition::trivial(12);
        let (canonical, sigma) = oracle.canonical_label(&empty, &p).unwrap();
        assert_eq!(canonical, empty);
        assert!(is_permutation(&sigma, 12));
        let generators = oracle.automorphism_group(&empty, &p).unwrap();
        assert!(generators.len() < 12 * 12);

        let complete: Vec<Edge> = (0..10).flat_map(|a| (a + 1..10).map(move |b| (a, b))).collect();
        let k10 = oracle_graph(10, false, &complete);
        let (canonical, _) = oracle.canonical_label(&k10, &VertexPartition::trivial(10)).unwrap();
        assert_eq!(canonical.edges.len(), 45);
        let generators = oracle.automorphism_group(&k10, &VertexPartition::trivial(10)).unwrap();
        assert!(generators.iter().all(|perm| is_automorphism(&k10, perm)));
        // the generators move every vertex onto every other
        let orbit: HashSet<usize> = closure_orbit(0, &generators);
        assert_eq!(orbit.len(), 10);
    }

    fn closure_orbit(start: usize, generators: &[Vec<usize>]) -> HashSet<usize> {
        let mut orbit = HashSet::from([start]);
        let mut frontier = vec![start];
        while let Some(v) = frontier.pop() {
            for generator in generators {
                if orbit.insert(generator[v]) {
                    frontier.push(generator[v]);
                }
            }
        }
        orbit
    }

    #[test]
    fn test_bad_partition_is_an_oracle_failure() {
        let oracle = RefinementOracle::new();
        let g = oracle_graph(3, false, &[]);
        let err = oracle.canonical_label(&g, &VertexPartition::trivial(2)).unwrap_err();
        assert!(matches!(err, Error::OracleFailure(_)));
    }
}

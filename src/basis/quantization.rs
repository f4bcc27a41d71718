//! Bases of the graphs that appear in deformation quantization, graded by
//! `(ground, aerial)` only: the edge count is fixed by the family.
//!
//! Besides the key mapping, the basis produces the linear relations between
//! the weights of its graphs (cyclic, eye-on-ground, flipping) and the
//! multiplication table of the aerial product.

use std::iter;

use hashbrown::HashSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BasisKey, GraphBasis, RelationMatrix, list_key};
use crate::cache::{GraphCaches, GraphList};
use crate::generate::FormalityOptions;
use crate::model::{Edge, FormalityGraph, Graph, Sign};
use crate::{Error, Result};

/// Which graphs the basis is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantizationFamily {
    /// Every aerial vertex is a wedge: out-degree 2.
    Kontsevich,
    /// Wedges plus exactly one tripod: one aerial vertex of out-degree 3.
    Leibniz,
}

impl QuantizationFamily {
    fn graph_name(self) -> &'static str {
        match self {
            QuantizationFamily::Kontsevich => "Kontsevich graph",
            QuantizationFamily::Leibniz => "Leibniz graph",
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuantizationGraphBasis {
    caches: GraphCaches,
    family: QuantizationFamily,
    options: FormalityOptions,
}

impl QuantizationGraphBasis {
    pub fn new(
        caches: GraphCaches,
        family: QuantizationFamily,
        positive_differential_order: Option<bool>,
        connected: Option<bool>,
        loops: Option<bool>,
        mod_ground_permutations: bool,
        max_aerial_in_degree: Option<usize>,
    ) -> Self {
        let options = FormalityOptions {
            positive_differential_order,
            connected,
            loops,
            mod_ground_permutations,
            max_aerial_in_degree,
            has_odd_automorphism: Some(false),
            ..FormalityOptions::default()
        };
        Self { caches, family, options }
    }

    /// Kontsevich graphs without further filters.
    pub fn kontsevich(caches: GraphCaches) -> Self {
        Self::new(caches, QuantizationFamily::Kontsevich, None, None, None, false, None)
    }

    /// Leibniz graphs without further filters.
    pub fn leibniz(caches: GraphCaches) -> Self {
        Self::new(caches, QuantizationFamily::Leibniz, None, None, None, false, None)
    }

    pub fn family(&self) -> QuantizationFamily {
        self.family
    }

    /// Edge count and cache options of the graded piece, `None` if the
    /// family has no graphs there.
    fn piece(&self, num_ground: usize, num_aerial: usize) -> Option<(usize, FormalityOptions)> {
        match self.family {
            // both families need an aerial vertex of maximal out-degree
            _ if num_aerial == 0 => None,
            QuantizationFamily::Kontsevich => Some((
                2 * num_aerial,
                FormalityOptions {
                    max_out_degree: Some(2),
                    num_verts_of_max_out_degree: Some(num_aerial),
                    ..self.options.clone()
                },
            )),
            QuantizationFamily::Leibniz => {
                let sorted_out_degrees: Vec<usize> = iter::repeat_n(0, num_ground)
                    .chain(iter::repeat_n(2, num_aerial - 1))
                    .chain([3])
                    .collect();
                Some((
                    2 * (num_aerial - 1) + 3,
                    FormalityOptions {
                        max_out_degree: Some(3),
                        num_verts_of_max_out_degree: Some(1),
                        sorted_out_degrees: Some(sorted_out_degrees),
                        ..self.options.clone()
                    },
                ))
            }
        }
    }

    pub fn graphs(&self, num_ground: usize, num_aerial: usize) -> Result<GraphList<FormalityGraph>> {
        match self.piece(num_ground, num_aerial) {
            Some((num_edges, options)) => self.caches.formality_graphs(num_ground, num_aerial, num_edges, &options),
            None => Ok(GraphList::new(Vec::new())),
        }
    }

    pub fn cardinality(&self, num_ground: usize, num_aerial: usize) -> Result<usize> {
        Ok(self.graphs(num_ground, num_aerial)?.len())
    }

    /// Index and sign of `graph` in its graded piece.
    fn index_of(&self, graph: &FormalityGraph) -> Result<Option<(usize, Sign)>> {
        Ok(self.graph_to_key(graph)?.map(|(key, sign)| (key[self.grading_size()], sign)))
    }

    /// Like [`index_of`](Self::index_of), for graphs the relation assumes
    /// to be in the span.
    fn required_index(&self, graph: &FormalityGraph, origin: &str) -> Result<(usize, Sign)> {
        self.index_of(graph)?.ok_or_else(|| {
            Error::InvalidOptions(format!("{origin} {graph} is outside the span of the {}", self.describe()))
        })
    }

    // ========================================================================
    // Weight relations
    // ========================================================================

    /// Relations from the cyclic relabeling of the ground vertices, one row
    /// per graph of the piece.
    ///
    /// Row `i` holds the relabeled graph (sign flipped when the number of
    /// ground vertices is even) plus, for every subset of edges not yet
    /// pointing at ground vertex 0, the graph with those edges redirected to
    /// it, signed by the parity of the in-degree of ground vertex 0 in the
    /// stored representative. Redirections producing double edges, or a
    /// ground vertex of in-degree 0, vanish.
    pub fn cyclic_weight_relations(&self, num_ground: usize, num_aerial: usize) -> Result<RelationMatrix> {
        if num_ground == 0 {
            return Err(Error::InvalidOptions(
                "cyclic weight relations need at least one ground vertex".to_string(),
            ));
        }
        let n = num_ground + num_aerial;
        let cyclic: Vec<usize> = iter::once(num_ground - 1)
            .chain(0..num_ground - 1)
            .chain(num_ground..n)
            .collect();
        let ground_parity = Sign::from_parity(num_ground % 2 == 0);
        let graphs = self.graphs(num_ground, num_aerial)?;

        let mut relations = RelationMatrix::new(graphs.len(), graphs.len());
        for (i, g) in graphs.iter().enumerate() {
            let (lhs_index, lhs_sign) = self.required_index(&g.relabeled(&cyclic), "cyclic relabeling")?;
            relations.set(i, lhs_index, (lhs_sign * ground_parity).as_i64());

            for edges in redirected_edge_sets(g.edges(), 0) {
                if !edges.iter().all_unique() {
                    continue;
                }
                let h = FormalityGraph::new(num_ground, num_aerial, edges)?;
                if !h.has_positive_differential_order() {
                    continue;
                }
                let Some((h_index, h_sign)) = self.index_of(&h)? else {
                    continue;
                };
                let normal = &graphs[h_index];
                let redirect_sign = Sign::from_parity(normal.in_degrees()[0] % 2 == 1);
                relations.add(i, h_index, (h_sign * redirect_sign).as_i64());
            }
        }
        debug!(num_ground, num_aerial, nnz = relations.nnz(), "cyclic weight relations");
        Ok(relations)
    }

    /// One unit row per graph with an eye on the ground: a 2-cycle between
    /// two aerial vertices that both point at the same ground vertex.
    pub fn eye_on_ground_weight_relations(&self, num_ground: usize, num_aerial: usize) -> Result<RelationMatrix> {
        let graphs = self.graphs(num_ground, num_aerial)?;
        let mut relations = RelationMatrix::new(0, graphs.len());
        for (index, g) in graphs.iter().enumerate() {
            if g.has_eye_on_ground() {
                let row = relations.push_row();
                relations.set(row, index, 1);
            }
        }
        Ok(relations)
    }

    /// Relations `g − (±)·flip(g)` where `flip` swaps the two ground
    /// vertices; the sign is `(−1)^aerial`. Each graph enters at most one
    /// relation, and self-flips with coefficient `+1` are trivial.
    ///
    /// Only defined for Kontsevich graphs on two ground vertices.
    pub fn flipping_weight_relations(&self, num_ground: usize, num_aerial: usize) -> Result<RelationMatrix> {
        if self.family != QuantizationFamily::Kontsevich {
            return Err(Error::InvalidOptions("flipping weight relations are defined for Kontsevich graphs".to_string()));
        }
        if num_ground != 2 {
            return Err(Error::InvalidOptions(format!(
                "flipping weight relations need 2 ground vertices, got {num_ground}"
            )));
        }
        let flip_sign = Sign::from_parity(num_aerial % 2 == 1);
        let graphs = self.graphs(num_ground, num_aerial)?;

        let mut relations = RelationMatrix::new(0, graphs.len());
        let mut seen = HashSet::new();
        for (g_index, g) in graphs.iter().enumerate() {
            if seen.contains(&g_index) {
                continue;
            }
            let (rhs_index, rhs_sign) = self.required_index(&g.ground_relabeled(&[1, 0]), "ground flip")?;
            if seen.contains(&rhs_index) {
                continue;
            }
            let coefficient = (rhs_sign * flip_sign).as_i64();
            if rhs_index == g_index && coefficient == 1 {
                continue;
            }
            let row = relations.push_row();
            relations.add(row, g_index, 1);
            relations.add(row, rhs_index, -coefficient);
            seen.insert(g_index);
            seen.insert(rhs_index);
        }
        Ok(relations)
    }

    /// `(g_index, h_index, gh_index, sign)` for every pair of graphs of the
    /// pieces `(ground, aerial1)` and `(ground, aerial2)`: their aerial
    /// product equals `sign` times graph `gh_index` of `(ground, aerial1 +
    /// aerial2)`.
    pub fn multiplication_table(
        &self,
        num_ground: usize,
        num_aerial1: usize,
        num_aerial2: usize,
    ) -> Result<Vec<(usize, usize, usize, Sign)>> {
        let left = self.graphs(num_ground, num_aerial1)?;
        let right = self.graphs(num_ground, num_aerial2)?;
        let mut table = Vec::with_capacity(left.len() * right.len());
        for (g_index, g) in left.iter().enumerate() {
            for (h_index, h) in right.iter().enumerate() {
                let (gh_index, sign) = self.required_index(&g.aerial_product(h)?, "aerial product")?;
                table.push((g_index, h_index, gh_index, sign));
            }
        }
        Ok(table)
    }
}

/// Every edge list obtained by redirecting a subset of the edges not
/// already ending at `target` to `target`, smallest subsets first.
fn redirected_edge_sets(edges: &[Edge], target: usize) -> impl Iterator<Item = Vec<Edge>> + '_ {
    let movable: Vec<usize> = (0..edges.len()).filter(|&k| edges[k].1 != target).collect();
    movable.into_iter().powerset().map(move |subset| {
        let mut redirected = edges.to_vec();
        for k in subset {
            redirected[k].1 = target;
        }
        redirected
    })
}

impl GraphBasis for QuantizationGraphBasis {
    type Graph = FormalityGraph;

    fn grading_size(&self) -> usize {
        2
    }

    fn graph_to_key(&self, graph: &FormalityGraph) -> Result<Option<(BasisKey, Sign)>> {
        let canonical = self.caches.generator().canonicalizer().canonicalize(graph)?;
        let (gv, av) = (graph.num_ground_vertices(), graph.num_aerial_vertices());
        Ok(list_key(&[gv, av], &canonical, &self.graphs(gv, av)?, false))
    }

    fn key_to_graph(&self, key: &BasisKey) -> Result<Option<(FormalityGraph, Sign)>> {
        let &[gv, av, index] = key.as_slice() else {
            return Ok(None);
        };
        Ok(self.graphs(gv, av)?.get(index).map(|g| (g.clone(), Sign::Plus)))
    }

    fn describe(&self) -> String {
        let options = &self.options;
        let mut filters = Vec::new();
        if options.positive_differential_order == Some(true) {
            filters.push("of positive differential order".to_string());
        }
        if options.connected == Some(true) {
            filters.push("connected".to_string());
        }
        if let Some(loops) = options.loops {
            filters.push(format!("{} loops", if loops { "with" } else { "without" }));
        }
        if options.mod_ground_permutations {
            filters.push("modulo permutations of ground vertices".to_string());
        }
        if let Some(max) = options.max_aerial_in_degree {
            filters.push(format!("with aerial vertices of in-degree <= {max}"));
        }
        let filters = if filters.is_empty() { String::new() } else { format!(" ({})", filters.join(", ")) };
        format!(
            "Basis consisting of representatives of isomorphism classes of {}s{filters} with no automorphisms that induce an odd permutation on edges",
            self.family.graph_name()
        )
    }
}

//! # Graph Bases
//!
//! A basis turns isomorphism classes of graphs into sparse-vector keys and
//! back. Keys start with the grading (the graph shape) and continue with
//! whatever identifies the class inside its graded piece: a position in a
//! cached list, a canonical edge list, or a position plus an undo
//! permutation for operadic bases.
//!
//! ## Implementations
//!
//! | Basis | Key |
//! |-------|-----|
//! | `UndirectedGraphComplexBasis` | `(v, e, index)` |
//! | `UndirectedGraphOperadBasis` | `(v, e, index, undo…)` |
//! | `DirectedGraphComplexBasis` | `(v, e, index)` |
//! | `FormalityGraphComplexBasis` | `(gv, av, e, index)` |
//! | `FormalityGraphComplexBasisLazy` | `(gv, av, e, edges…)` |
//! | `FormalityGraphOperadBasis` | `(gv, av, e, index, undo…)` |
//! | `QuantizationGraphBasis` | `(gv, av, index)` |
//!
//! `None` from either direction means "not in the span of the basis"; it is
//! never an error.

pub mod undirected;
pub mod directed;
pub mod formality;
pub mod quantization;
pub mod relations;

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::Result;
use crate::cache::GraphList;
use crate::canon::Canonical;
use crate::model::permutation::is_permutation;
use crate::model::{Graph, Sign};

pub use directed::DirectedGraphComplexBasis;
pub use formality::{FormalityGraphComplexBasis, FormalityGraphComplexBasisLazy, FormalityGraphOperadBasis};
pub use quantization::{QuantizationFamily, QuantizationGraphBasis};
pub use relations::RelationMatrix;
pub use undirected::{UndirectedGraphComplexBasis, UndirectedGraphOperadBasis};

// ============================================================================
// BasisKey
// ============================================================================

/// Hashable key of one basis element. The first `grading_size()` entries
/// are the grading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BasisKey(SmallVec<[usize; 8]>);

impl BasisKey {
    pub fn new(parts: &[usize]) -> Self {
        Self(SmallVec::from_slice(parts))
    }

    /// The leading `size` entries, or the whole key if it is shorter.
    pub fn grading(&self, size: usize) -> &[usize] {
        &self.0[..size.min(self.0.len())]
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    fn extend_from_slice(&mut self, parts: &[usize]) {
        self.0.extend_from_slice(parts);
    }
}

impl Deref for BasisKey {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for BasisKey {
    fn from(parts: Vec<usize>) -> Self {
        Self(SmallVec::from_vec(parts))
    }
}

impl FromIterator<usize> for BasisKey {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for BasisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{part}")?;
        }
        write!(f, ")")
    }
}

// ============================================================================
// GraphBasis Trait
// ============================================================================

/// Bijection between basis keys and signed graphs.
///
/// `graph_to_key` maps any graph of the flavor to the key of its class and
/// the sign relating the graph to the stored representative, or `None` if
/// the class is outside the span (filtered out, or vanishing because of an
/// odd automorphism). `key_to_graph` returns the representative with the
/// sign it carries relative to the key.
pub trait GraphBasis: Send + Sync + 'static {
    type Graph: Graph + fmt::Display;

    /// Number of leading key entries that form the grading.
    fn grading_size(&self) -> usize;

    fn graph_to_key(&self, graph: &Self::Graph) -> Result<Option<(BasisKey, Sign)>>;

    fn key_to_graph(&self, key: &BasisKey) -> Result<Option<(Self::Graph, Sign)>>;

    /// Short description for log lines and `Display` of modules.
    fn describe(&self) -> String;
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Key `prefix ++ [index]` (plus the undo permutation for operadic bases)
/// of a canonical graph, if it is in `list`.
pub(crate) fn list_key<G: Graph>(
    prefix: &[usize],
    canonical: &Canonical<G>,
    list: &GraphList<G>,
    with_undo: bool,
) -> Option<(BasisKey, Sign)> {
    let index = list.index_of(&canonical.graph)?;
    let mut key = BasisKey::new(prefix);
    key.extend_from_slice(&[index]);
    if with_undo {
        key.extend_from_slice(&canonical.undo);
    }
    Some((key, canonical.sign))
}

/// Apply the undo permutation of an operadic key to a stored graph and
/// re-sort its edges.
pub(crate) fn undo_relabeling<G: Graph>(graph: &G, undo: &[usize]) -> Option<(G, Sign)> {
    if !is_permutation(undo, graph.num_vertices()) {
        return None;
    }
    let mut relabeled = graph.relabeled(undo);
    let sign = relabeled.canonicalize_edges();
    Some((relabeled, sign))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::Canonicalizer;
    use crate::model::UndirectedGraph;

    #[test]
    fn test_key_grading_and_display() {
        let key = BasisKey::new(&[2, 1, 0]);
        assert_eq!(key.grading(2), &[2, 1]);
        assert_eq!(key.grading(5), &[2, 1, 0]);
        assert_eq!(key.to_string(), "(2, 1, 0)");
        assert_eq!(BasisKey::from(vec![2, 1, 0]), key);
        assert_eq!(key.len(), 3);
    }

    #[test]
    fn test_list_key_with_undo() {
        let canonicalizer = Canonicalizer::default();
        let g = UndirectedGraph::new(3, vec![(0, 1)]).unwrap();
        let canonical = canonicalizer.canonicalize(&g).unwrap();
        let list = GraphList::new(vec![canonical.graph.clone()]);

        let (key, _) = list_key(&[3, 1], &canonical, &list, false).unwrap();
        assert_eq!(key.as_slice(), &[3, 1, 0]);

        let (key, _) = list_key(&[3, 1], &canonical, &list, true).unwrap();
        assert_eq!(key.len(), 6);
        let (recovered, _) = undo_relabeling(&canonical.graph, &key[3..]).unwrap();
        assert_eq!(recovered, g);
    }

    #[test]
    fn test_undo_must_be_a_permutation() {
        let g = UndirectedGraph::new(2, vec![(0, 1)]).unwrap();
        assert!(undo_relabeling(&g, &[0, 0]).is_none());
        assert!(undo_relabeling(&g, &[0]).is_none());
    }
}

//! End-to-end tests for canonical forms.
//!
//! Randomized checks of the canonicalizer laws on small graphs, plus the
//! concrete single-edge and 2-cycle scenarios.

use graph_complex::model::permutation::identity;
use graph_complex::{Canonicalizer, DirectedGraph, FormalityGraph, Graph, Sign, UndirectedGraph};
use petgraph::algo::is_isomorphic;
use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn to_petgraph(g: &UndirectedGraph) -> UnGraph<(), ()> {
    let mut p = UnGraph::new_undirected();
    for _ in 0..g.num_vertices() {
        p.add_node(());
    }
    for &(a, b) in g.edges() {
        p.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
    }
    p
}

fn to_petgraph_directed(g: &DirectedGraph) -> DiGraph<(), ()> {
    let mut p = DiGraph::new();
    for _ in 0..g.num_vertices() {
        p.add_node(());
    }
    for &(a, b) in g.edges() {
        p.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
    }
    p
}

/// A simple undirected graph on up to six vertices and a relabeling of it.
fn undirected_with_relabeling() -> impl Strategy<Value = (UndirectedGraph, Vec<usize>)> {
    (1usize..=6).prop_flat_map(|n| {
        let pairs: Vec<(usize, usize)> = (0..n).flat_map(|a| (a + 1..n).map(move |b| (a, b))).collect();
        let mask = proptest::collection::vec(any::<bool>(), pairs.len());
        let relabeling = Just((0..n).collect::<Vec<usize>>()).prop_shuffle();
        (mask, relabeling).prop_map(move |(mask, relabeling)| {
            let edges = pairs.iter().zip(mask).filter(|(_, keep)| *keep).map(|(&e, _)| e).collect();
            (UndirectedGraph::new(n, edges).unwrap(), relabeling)
        })
    })
}

/// A simple digraph (2-cycles allowed) on up to five vertices.
fn directed_with_relabeling() -> impl Strategy<Value = (DirectedGraph, Vec<usize>)> {
    (1usize..=5).prop_flat_map(|n| {
        let arcs: Vec<(usize, usize)> =
            (0..n).flat_map(|a| (0..n).filter(move |&b| b != a).map(move |b| (a, b))).collect();
        let mask = proptest::collection::vec(proptest::bool::weighted(0.3), arcs.len());
        let relabeling = Just((0..n).collect::<Vec<usize>>()).prop_shuffle();
        (mask, relabeling).prop_map(move |(mask, relabeling)| {
            let edges = arcs.iter().zip(mask).filter(|(_, keep)| *keep).map(|(&e, _)| e).collect();
            (DirectedGraph::new(n, edges).unwrap(), relabeling)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_canonical_form_is_idempotent((g, _) in undirected_with_relabeling()) {
        let canonicalizer = Canonicalizer::default();
        let first = canonicalizer.canonicalize(&g).unwrap();
        let second = canonicalizer.canonicalize(&first.graph).unwrap();
        prop_assert_eq!(&second.graph, &first.graph);
        prop_assert_eq!(second.undo, identity(g.num_vertices()));
        prop_assert_eq!(second.sign, Sign::Plus);
    }

    #[test]
    fn prop_canonical_form_is_isomorphic_and_label_invariant((g, relabeling) in undirected_with_relabeling()) {
        let canonicalizer = Canonicalizer::default();
        let canonical = canonicalizer.canonicalize(&g).unwrap();
        prop_assert!(is_isomorphic(&to_petgraph(&g), &to_petgraph(&canonical.graph)));

        let relabeled = canonicalizer.canonicalize(&g.relabeled(&relabeling)).unwrap();
        prop_assert_eq!(relabeled.graph, canonical.graph);
    }

    #[test]
    fn prop_undo_recovers_the_input((g, _) in undirected_with_relabeling()) {
        let canonical = Canonicalizer::default().canonicalize(&g).unwrap();
        let mut back = canonical.graph.relabeled(&canonical.undo);
        back.canonicalize_edges();
        let mut sorted = g.clone();
        sorted.canonicalize_edges();
        prop_assert_eq!(back, sorted);
    }

    #[test]
    fn prop_reversing_edges_flips_sign_by_parity((g, _) in undirected_with_relabeling()) {
        let canonicalizer = Canonicalizer::default();
        let m = g.num_edges();
        let reversed = g.with_edges(g.edges().iter().rev().copied().collect()).unwrap();
        let a = canonicalizer.canonicalize(&g).unwrap();
        let b = canonicalizer.canonicalize(&reversed).unwrap();
        prop_assert_eq!(&a.graph, &b.graph);
        let reversal = Sign::from_parity((m * m.saturating_sub(1) / 2) % 2 == 1);
        prop_assert_eq!(b.sign, a.sign * reversal);
    }

    #[test]
    fn prop_directed_canonical_form((g, relabeling) in directed_with_relabeling()) {
        let canonicalizer = Canonicalizer::default();
        let canonical = canonicalizer.canonicalize(&g).unwrap();
        prop_assert!(is_isomorphic(&to_petgraph_directed(&g), &to_petgraph_directed(&canonical.graph)));
        let again = canonicalizer.canonicalize(&canonical.graph).unwrap();
        prop_assert_eq!(&again.graph, &canonical.graph);
        prop_assert_eq!(again.sign, Sign::Plus);
        let relabeled = canonicalizer.canonicalize(&g.relabeled(&relabeling)).unwrap();
        prop_assert_eq!(relabeled.graph, canonical.graph);
    }

    #[test]
    fn prop_odd_automorphism_is_label_invariant((g, relabeling) in undirected_with_relabeling()) {
        let canonicalizer = Canonicalizer::default();
        prop_assert_eq!(
            canonicalizer.has_odd_automorphism(&g).unwrap(),
            canonicalizer.has_odd_automorphism(&g.relabeled(&relabeling)).unwrap()
        );
    }
}

// ============================================================================
// Concrete scenarios
// ============================================================================

#[test]
fn test_single_edge_is_canonical_and_even() {
    let canonicalizer = Canonicalizer::default();
    let edge = UndirectedGraph::new(2, vec![(0, 1)]).unwrap();
    let canonical = canonicalizer.canonicalize(&edge).unwrap();
    assert_eq!(canonical.graph, edge);
    assert_eq!(canonical.sign, Sign::Plus);
    assert!(!canonicalizer.has_odd_automorphism(&edge).unwrap());
}

#[test]
fn test_two_cycle_is_odd() {
    let canonicalizer = Canonicalizer::default();
    let two_cycle = DirectedGraph::new(2, vec![(0, 1), (1, 0)]).unwrap();
    assert!(canonicalizer.has_odd_automorphism(&two_cycle).unwrap());
}

#[test]
fn test_tetrahedron_is_even() {
    let canonicalizer = Canonicalizer::default();
    let k4 = UndirectedGraph::new(4, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]).unwrap();
    assert!(!canonicalizer.has_odd_automorphism(&k4).unwrap());
}

#[test]
fn test_ground_vertices_are_not_interchangeable() {
    let canonicalizer = Canonicalizer::default();
    let left = FormalityGraph::new(2, 1, vec![(2, 0)]).unwrap();
    let right = FormalityGraph::new(2, 1, vec![(2, 1)]).unwrap();
    assert_ne!(
        canonicalizer.canonicalize(&left).unwrap().graph,
        canonicalizer.canonicalize(&right).unwrap().graph
    );
}

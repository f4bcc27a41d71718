//! End-to-end tests for the bases: key scenarios, the round-trip law, the
//! orientation map and the quantization relations.

use std::sync::Arc;

use graph_complex::{
    BasisKey, DirectedGraph, DirectedGraphComplexBasis, FormalityGraph, FormalityGraphComplexBasis,
    FormalityGraphComplexBasisLazy, Graph, GraphBasis, GraphCaches, GraphModule, MemoryStore,
    QuantizationGraphBasis, Sign, UndirectedGraph, UndirectedGraphComplexBasis,
    UndirectedGraphOperadBasis,
};
use pretty_assertions::assert_eq;

fn tetrahedron() -> UndirectedGraph {
    UndirectedGraph::new(4, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]).unwrap()
}

// ============================================================================
// 1. Concrete scenarios
// ============================================================================

#[test]
fn test_single_edge_has_key_2_1_0() {
    let basis = UndirectedGraphComplexBasis::new(GraphCaches::in_memory(), false, false, 0).unwrap();
    let edge = UndirectedGraph::new(2, vec![(0, 1)]).unwrap();
    assert_eq!(basis.graphs(2, 1).unwrap().to_vec(), vec![edge.clone()]);
    assert_eq!(basis.graph_to_key(&edge).unwrap(), Some((BasisKey::new(&[2, 1, 0]), Sign::Plus)));
}

#[test]
fn test_two_cycle_is_outside_every_even_basis() {
    let two_cycle = DirectedGraph::new(2, vec![(0, 1), (1, 0)]).unwrap();
    for loops in [None, Some(true)] {
        let basis = DirectedGraphComplexBasis::new(GraphCaches::in_memory(), false, false, 0, loops);
        assert_eq!(basis.graph_to_key(&two_cycle).unwrap(), None);
    }
}

#[test]
fn test_keys_are_stable_across_cache_instances() {
    let store = MemoryStore::new();
    let first = UndirectedGraphComplexBasis::new(GraphCaches::with_store(Arc::new(store.clone())), true, false, 3)
        .unwrap();
    let second = UndirectedGraphComplexBasis::new(GraphCaches::with_store(Arc::new(store)), true, false, 3)
        .unwrap();
    let relabeled = tetrahedron().relabeled(&[2, 0, 3, 1]);
    assert_eq!(first.graph_to_key(&relabeled).unwrap(), second.graph_to_key(&relabeled).unwrap());
}

// ============================================================================
// 2. Round-trip law
// ============================================================================

#[test]
fn test_round_trip_through_complex_basis() {
    let basis = UndirectedGraphComplexBasis::new(GraphCaches::in_memory(), true, false, 0).unwrap();
    for e in 4..=7 {
        for g in basis.graphs(5, e).unwrap().iter() {
            let shuffled = g.relabeled(&[4, 2, 0, 3, 1]);
            let reversed = shuffled.with_edges(shuffled.edges().iter().rev().copied().collect()).unwrap();
            let (key, sign) = basis.graph_to_key(&shuffled).unwrap().unwrap();
            let (reversed_key, reversed_sign) = basis.graph_to_key(&reversed).unwrap().unwrap();
            assert_eq!(reversed_key, key);
            let reversal = Sign::from_parity((e * (e - 1) / 2) % 2 == 1);
            assert_eq!(reversed_sign, sign * reversal);

            let (representative, representative_sign) = basis.key_to_graph(&key).unwrap().unwrap();
            assert_eq!(&representative, g);
            assert_eq!(representative_sign, Sign::Plus);
        }
    }
}

#[test]
fn test_operad_round_trip_keeps_labels() {
    let basis = UndirectedGraphOperadBasis::new(GraphCaches::in_memory());
    let g = UndirectedGraph::new(4, vec![(2, 3), (0, 1), (1, 3), (0, 3), (1, 2), (0, 2)]).unwrap();
    let (key, to_key) = basis.graph_to_key(&g).unwrap().unwrap();
    let (back, from_key) = basis.key_to_graph(&key).unwrap().unwrap();

    let mut sorted = g.clone();
    let sorting = sorted.canonicalize_edges();
    assert_eq!(back, sorted);
    assert_eq!(to_key * from_key, sorting);
}

#[test]
fn test_lazy_and_listed_bases_agree() {
    let caches = GraphCaches::in_memory();
    let listed = FormalityGraphComplexBasis::new(caches.clone(), Some(true), None, None);
    let lazy = FormalityGraphComplexBasisLazy::new(caches, Some(true), None, None);
    for g in listed.graphs(2, 2, 4).unwrap().iter() {
        let (key, sign) = lazy.graph_to_key(g).unwrap().unwrap();
        assert_eq!(sign, Sign::Plus);
        assert_eq!(key.grading(lazy.grading_size()), &[2, 2, 4]);
        assert_eq!(lazy.key_to_graph(&key).unwrap(), Some((g.clone(), Sign::Plus)));
    }
}

#[test]
fn test_positive_differential_order_filter() {
    let basis = FormalityGraphComplexBasis::new(GraphCaches::in_memory(), Some(true), None, None);
    // ground vertex 1 receives no edge
    let g = FormalityGraph::new(2, 1, vec![(2, 0)]).unwrap();
    assert_eq!(basis.graph_to_key(&g).unwrap(), None);
    assert!(basis.graphs(2, 1, 2).unwrap().iter().all(|g| g.has_positive_differential_order()));
}

// ============================================================================
// 3. Orientation map
// ============================================================================

#[test]
fn test_orientation_map_matches_sum_of_orientations() {
    let caches = GraphCaches::in_memory();
    let directed = Arc::new(DirectedGraphComplexBasis::new(caches, true, false, 0, Some(false)));
    let undirected = directed.undirected_basis().unwrap();
    let module = GraphModule::<i64, _>::new(directed.clone());

    let (key, _) = undirected.graph_to_key(&tetrahedron()).unwrap().unwrap();
    let k4 = undirected.key_to_graph(&key).unwrap().unwrap().0;
    let m = k4.num_edges();
    let orientations: Vec<(i64, DirectedGraph)> = (0u32..1 << m)
        .map(|mask| {
            let arcs = k4
                .edges()
                .iter()
                .enumerate()
                .map(|(bit, &(a, b))| if (mask >> bit) & 1 == 0 { (a, b) } else { (b, a) })
                .collect();
            (1, DirectedGraph::new(4, arcs).unwrap())
        })
        .collect();
    let expected = module.from_terms(orientations).unwrap();
    let transported = module.from_coefficients(directed.undirected_to_directed(&key).unwrap());
    assert_eq!(transported, expected);
}

// ============================================================================
// 4. Quantization relations
// ============================================================================

#[test]
fn test_kontsevich_relations_have_basis_dimensions() {
    let basis = QuantizationGraphBasis::kontsevich(GraphCaches::in_memory());
    let n = basis.cardinality(2, 2).unwrap();
    assert!(n > 0);

    let cyclic = basis.cyclic_weight_relations(2, 2).unwrap();
    assert_eq!((cyclic.num_rows(), cyclic.num_cols()), (n, n));

    let flipping = basis.flipping_weight_relations(2, 2).unwrap();
    assert!(flipping.num_rows() <= n);
    for row in 0..flipping.num_rows() {
        let entries = flipping.row(row);
        assert!(!entries.is_empty() && entries.len() <= 2);
    }

    let eyes = basis.eye_on_ground_weight_relations(2, 2).unwrap();
    for (row, col, value) in eyes.iter() {
        assert_eq!(value, 1);
        assert!(basis.graphs(2, 2).unwrap()[col].has_eye_on_ground());
        assert!(row < eyes.num_rows());
    }
}

#[test]
fn test_multiplication_table_covers_all_pairs() {
    let basis = QuantizationGraphBasis::kontsevich(GraphCaches::in_memory());
    let n1 = basis.cardinality(2, 1).unwrap();
    let table = basis.multiplication_table(2, 1, 1).unwrap();
    assert_eq!(table.len(), n1 * n1);
    let wedges = basis.graphs(2, 1).unwrap();
    for &(g, h, gh, sign) in &table {
        let product = wedges[g].aerial_product(&wedges[h]).unwrap();
        assert_eq!(product.num_edges(), 4);
        assert_eq!(basis.graph_to_key(&product).unwrap(), Some((BasisKey::new(&[2, 2, gh]), sign)));
    }
}

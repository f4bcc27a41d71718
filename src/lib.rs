//! # graph-complex-rs: Graphs up to Isomorphism, with Signs
//!
//! Formal linear combinations of graphs modulo isomorphism, as used in the
//! Kontsevich, Leibniz and formality graph complexes.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: isomorphism, enumeration and persistence are traits;
//!    the crate bundles a pure-Rust implementation of each
//! 2. **Clean DTOs**: `UndirectedGraph`, `DirectedGraph`, `FormalityGraph`
//!    cross all boundaries
//! 3. **Explicit caches**: a `GraphCaches` value is created once and handed to
//!    every basis, never a hidden global
//! 4. **Signs everywhere**: every operation that reorders edges reports the
//!    parity as a `Sign`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use graph_complex::{GraphCaches, GraphModule, UndirectedGraph, UndirectedGraphComplexBasis};
//!
//! # fn example() -> graph_complex::Result<()> {
//! let caches = GraphCaches::in_memory();
//! let basis = UndirectedGraphComplexBasis::new(caches, true, false, 0)?;
//! let module = GraphModule::<i64, _>::new(Arc::new(basis));
//!
//! let tetrahedron = UndirectedGraph::new(4, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)])?;
//! let v = module.element(&tetrahedron)?;
//! let w = module.from_terms([(3, tetrahedron.clone()), (-3, tetrahedron)])?;
//! assert!(w.is_zero());
//! println!("{v}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Layers
//!
//! | Layer | Module | Description |
//! |-------|--------|-------------|
//! | Model | `model` | Graph flavors, signs, permutations |
//! | Canonicalizer | `canon` | Canonical forms, odd automorphisms |
//! | Generator | `generate` | Enumeration of canonical graphs under filters |
//! | Store | `storage` | Append/commit persistence of generated lists |
//! | Cache | `cache` | Memoized, optionally persisted graph lists |
//! | Basis | `basis` | Graph ↔ key bijections, relation matrices |
//! | Vector | `vector` | Sparse graph vectors over a ring |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod canon;
pub mod generate;
pub mod storage;
pub mod cache;
pub mod basis;
pub mod vector;

use std::path::PathBuf;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    DirectedGraph, Edge, FormalityGraph, Graph, Sign, UndirectedGraph, VertexPartition,
};

// ============================================================================
// Re-exports: Canonicalizer and generator
// ============================================================================

pub use canon::{Canonical, Canonicalizer, GraphIsomorphismOracle, OracleGraph, RefinementOracle};
pub use generate::{
    DirectedOptions, EnumerationRequest, ExhaustiveEnumerator, FormalityOptions, Generator,
    GraphEnumerationOracle, UndirectedOptions,
};

// ============================================================================
// Re-exports: Storage and cache
// ============================================================================

pub use storage::{FileStore, GraphStore, MemoryStore, StoreConfig};
pub use cache::{CacheConfig, GraphCaches, GraphList, MemoTable, OrientationRecord};

// ============================================================================
// Re-exports: Bases and vectors
// ============================================================================

pub use basis::{
    BasisKey, DirectedGraphComplexBasis, FormalityGraphComplexBasis,
    FormalityGraphComplexBasisLazy, FormalityGraphOperadBasis, GraphBasis,
    QuantizationFamily, QuantizationGraphBasis, RelationMatrix, UndirectedGraphComplexBasis,
    UndirectedGraphOperadBasis,
};
pub use vector::{GraphModule, GraphVector, Ring};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid graph shape: {0}")]
    InvalidGraphShape(String),

    #[error("Cannot canonicalize graph with parallel edges: {0}")]
    AmbiguousMultiEdge(String),

    #[error("Cache storage unavailable at {}: {message}", path.display())]
    CacheStorageUnavailable { path: PathBuf, message: String },

    #[error("Oracle failure: {0}")]
    OracleFailure(String),

    #[error("Generation failed for {context}: {source}")]
    GenerationFailed {
        context: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Module mismatch: {0}")]
    ModuleMismatch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

//! # Graph Vectors
//!
//! Sparse linear combinations of basis elements over a coefficient ring.
//!
//! A [`GraphModule`] pairs a ring type with a shared basis; its elements,
//! [`GraphVector`]s, map basis keys to coefficients. Zero coefficients are
//! never stored, so `len()` counts the non-zero terms.
//!
//! ```text
//! graph ── basis.graph_to_key ──► (key, sign) ── coefficient · sign ──► vector
//! vector ── basis.key_to_graph ──► (graph, sign) ── coefficient · sign ──► terms
//! ```

pub mod ring;

use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Mul, Neg};
use std::sync::Arc;

use hashbrown::HashMap;
use itertools::Itertools;

use crate::basis::{BasisKey, GraphBasis};
use crate::model::Graph;
use crate::{Error, Result};

pub use ring::Ring;

// ============================================================================
// GraphModule
// ============================================================================

/// The free module over `R` spanned by the basis `B`.
///
/// Cloning shares the basis. Two modules are the same module when they
/// share the same basis instance.
pub struct GraphModule<R, B> {
    basis: Arc<B>,
    _ring: PhantomData<fn() -> R>,
}

impl<R, B> Clone for GraphModule<R, B> {
    fn clone(&self) -> Self {
        Self { basis: Arc::clone(&self.basis), _ring: PhantomData }
    }
}

impl<R, B> PartialEq for GraphModule<R, B> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.basis, &other.basis)
    }
}

impl<R: Ring, B: GraphBasis> GraphModule<R, B> {
    pub fn new(basis: Arc<B>) -> Self {
        Self { basis, _ring: PhantomData }
    }

    pub fn basis(&self) -> &Arc<B> {
        &self.basis
    }

    pub fn zero(&self) -> GraphVector<R, B> {
        GraphVector { module: self.clone(), coefficients: HashMap::new() }
    }

    /// The vector of a single graph: `±1` times its basis element, or zero
    /// if the graph is outside the span.
    pub fn element(&self, graph: &B::Graph) -> Result<GraphVector<R, B>> {
        let mut vector = self.zero();
        if let Some((key, sign)) = self.basis.graph_to_key(graph)? {
            vector.coefficients.insert(key, R::from_sign(sign));
        }
        Ok(vector)
    }

    /// Sum of `coefficient · graph` over `terms`. Graphs outside the span
    /// contribute nothing.
    pub fn from_terms<I>(&self, terms: I) -> Result<GraphVector<R, B>>
    where
        I: IntoIterator<Item = (R, B::Graph)>,
    {
        let mut vector = self.zero();
        for (coefficient, graph) in terms {
            if let Some((key, sign)) = self.basis.graph_to_key(&graph)? {
                vector.add_term(key, coefficient * R::from_sign(sign));
            }
        }
        Ok(vector)
    }

    /// Vector with the given coefficients by key. Keys are not checked
    /// against the basis.
    pub fn from_coefficients<I>(&self, coefficients: I) -> GraphVector<R, B>
    where
        I: IntoIterator<Item = (BasisKey, R)>,
    {
        let mut vector = self.zero();
        for (key, coefficient) in coefficients {
            vector.add_term(key, coefficient);
        }
        vector
    }

    /// Re-express a vector of another basis of the same graph flavor in
    /// this one.
    pub fn convert<B2>(&self, vector: &GraphVector<R, B2>) -> Result<GraphVector<R, B>>
    where
        B2: GraphBasis<Graph = B::Graph>,
    {
        self.from_terms(vector.terms()?)
    }
}

impl<R, B: GraphBasis> fmt::Debug for GraphModule<R, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphModule").field("basis", &self.basis.describe()).finish()
    }
}

impl<R, B: GraphBasis> fmt::Display for GraphModule<R, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Module over {} with {}", std::any::type_name::<R>(), self.basis.describe())
    }
}

// ============================================================================
// GraphVector
// ============================================================================

/// An element of a [`GraphModule`].
pub struct GraphVector<R, B> {
    module: GraphModule<R, B>,
    coefficients: HashMap<BasisKey, R>,
}

impl<R: Clone, B> Clone for GraphVector<R, B> {
    fn clone(&self) -> Self {
        Self { module: self.module.clone(), coefficients: self.coefficients.clone() }
    }
}

impl<R: Ring, B: GraphBasis> GraphVector<R, B> {
    pub fn module(&self) -> &GraphModule<R, B> {
        &self.module
    }

    /// Number of non-zero terms.
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn coefficient(&self, key: &BasisKey) -> R {
        self.coefficients.get(key).cloned().unwrap_or_else(R::zero)
    }

    /// Coefficient of the basis element of `graph`, corrected by the sign
    /// relating `graph` to it.
    pub fn coefficient_of(&self, graph: &B::Graph) -> Result<R> {
        Ok(match self.module.basis.graph_to_key(graph)? {
            Some((key, sign)) => self.coefficient(&key) * R::from_sign(sign),
            None => R::zero(),
        })
    }

    /// `(key, coefficient)` pairs sorted by key.
    pub fn coefficients(&self) -> Vec<(BasisKey, R)> {
        self.coefficients
            .iter()
            .map(|(key, c)| (key.clone(), c.clone()))
            .sorted_by(|a, b| a.0.cmp(&b.0))
            .collect()
    }

    /// `(coefficient · sign, graph)` pairs sorted by key, with graphs rebuilt
    /// through the basis.
    pub fn terms(&self) -> Result<Vec<(R, B::Graph)>> {
        let mut terms = Vec::with_capacity(self.len());
        for (key, coefficient) in self.coefficients() {
            let (graph, sign) = self.module.basis.key_to_graph(&key)?.ok_or_else(|| {
                Error::ModuleMismatch(format!("key {key} is not in {}", self.module.basis.describe()))
            })?;
            terms.push((coefficient * R::from_sign(sign), graph));
        }
        Ok(terms)
    }

    /// Grading tuples of the non-zero terms.
    pub fn gradings(&self) -> BTreeSet<Vec<usize>> {
        let size = self.module.basis.grading_size();
        self.coefficients.keys().map(|key| key.grading(size).to_vec()).collect()
    }

    pub fn homogeneous_part(&self, grading: &[usize]) -> Self {
        let size = self.module.basis.grading_size();
        let coefficients = self
            .coefficients
            .iter()
            .filter(|(key, _)| key.grading(size) == grading)
            .map(|(key, c)| (key.clone(), c.clone()))
            .collect();
        Self { module: self.module.clone(), coefficients }
    }

    /// Apply `f` to every coefficient, possibly changing the ring.
    pub fn map_coefficients<R2, F>(&self, f: F) -> GraphVector<R2, B>
    where
        R2: Ring,
        F: Fn(&R) -> R2,
    {
        let module = GraphModule::new(Arc::clone(&self.module.basis));
        let coefficients = self
            .coefficients
            .iter()
            .map(|(key, c)| (key.clone(), f(c)))
            .filter(|(_, c)| !c.is_zero())
            .collect();
        GraphVector { module, coefficients }
    }

    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        self.check_module(other)?;
        let mut sum = self.clone();
        for (key, c) in &other.coefficients {
            sum.add_term(key.clone(), c.clone());
        }
        Ok(sum)
    }

    pub fn checked_sub(&self, other: &Self) -> Result<Self> {
        self.check_module(other)?;
        let mut difference = self.clone();
        for (key, c) in &other.coefficients {
            difference.add_term(key.clone(), -c.clone());
        }
        Ok(difference)
    }

    pub fn scale(&self, factor: &R) -> Self {
        let module = self.module.clone();
        let coefficients = self
            .coefficients
            .iter()
            .map(|(key, c)| (key.clone(), c.clone() * factor.clone()))
            .filter(|(_, c)| !c.is_zero())
            .collect();
        Self { module, coefficients }
    }

    /// Insert `other` into vertex `position` of every graph of `self`.
    ///
    /// Each pair of terms `c1·g1`, `c2·g2` contributes `c1·c2` times every
    /// graph of `g1.insertion_graphs(position, g2)`; the results are
    /// re-expressed in this module.
    pub fn insertion(&self, position: usize, other: &Self) -> Result<Self> {
        self.check_module(other)?;
        let left = self.terms()?;
        let right = other.terms()?;
        let mut result = self.module.zero();
        for (c1, g1) in &left {
            for (c2, g2) in &right {
                let product = c1.clone() * c2.clone();
                if product.is_zero() {
                    continue;
                }
                for g in g1.insertion_graphs(position, g2) {
                    if let Some((key, sign)) = self.module.basis.graph_to_key(&g)? {
                        result.add_term(key, product.clone() * R::from_sign(sign));
                    }
                }
            }
        }
        Ok(result)
    }

    fn add_term(&mut self, key: BasisKey, coefficient: R) {
        let sum = match self.coefficients.remove(&key) {
            Some(current) => current + coefficient,
            None => coefficient,
        };
        if !sum.is_zero() {
            self.coefficients.insert(key, sum);
        }
    }

    fn check_module(&self, other: &Self) -> Result<()> {
        if self.module != other.module {
            return Err(Error::ModuleMismatch(format!(
                "{} and {} are different modules",
                self.module, other.module
            )));
        }
        Ok(())
    }
}

impl<R: Ring, B: GraphBasis> PartialEq for GraphVector<R, B> {
    /// Equal when the difference has only zero coefficients. Vectors of
    /// different modules are never equal.
    fn eq(&self, other: &Self) -> bool {
        self.checked_sub(other).is_ok_and(|difference| difference.is_zero())
    }
}

impl<R: Ring, B: GraphBasis> Neg for GraphVector<R, B> {
    type Output = Self;

    fn neg(self) -> Self {
        let coefficients = self.coefficients.into_iter().map(|(key, c)| (key, -c)).collect();
        Self { module: self.module, coefficients }
    }
}

impl<R: Ring, B: GraphBasis> Mul<R> for GraphVector<R, B> {
    type Output = Self;

    fn mul(self, factor: R) -> Self {
        self.scale(&factor)
    }
}

impl<R: Ring, B: GraphBasis> fmt::Debug for GraphVector<R, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.coefficients()).finish()
    }
}

/// `c1*g1 + c2*g2 + …`, coefficients other than `1` in parentheses, `0`
/// for the zero vector.
impl<R: Ring, B: GraphBasis> fmt::Display for GraphVector<R, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (i, (key, c)) in self.coefficients().into_iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            let (graph, sign) = match self.module.basis.key_to_graph(&key) {
                Ok(Some(found)) => found,
                _ => return Err(fmt::Error),
            };
            let c = c * R::from_sign(sign);
            if c.is_one() {
                write!(f, "1*{graph}")?;
            } else {
                write!(f, "({c})*{graph}")?;
            }
        }
        Ok(())
    }
}

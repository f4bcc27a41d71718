//! Signs and permutations.
//!
//! Graphs live in an exterior algebra on their edges: reordering the edge
//! list multiplies a graph by the parity of the reordering. Everything that
//! moves edges around reports that parity as a [`Sign`].

use std::fmt;
use std::ops::{Mul, MulAssign, Neg};

use serde::{Deserialize, Serialize};

/// Parity of a permutation, as a multiplicative `±1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    /// `Minus` iff `odd`.
    pub fn from_parity(odd: bool) -> Self {
        if odd { Sign::Minus } else { Sign::Plus }
    }

    pub fn is_negative(self) -> bool {
        self == Sign::Minus
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Sign::Plus => 1,
            Sign::Minus => -1,
        }
    }
}

impl Mul for Sign {
    type Output = Sign;

    fn mul(self, rhs: Sign) -> Sign {
        Sign::from_parity(self != rhs)
    }
}

impl MulAssign for Sign {
    fn mul_assign(&mut self, rhs: Sign) {
        *self = *self * rhs;
    }
}

impl Neg for Sign {
    type Output = Sign;

    fn neg(self) -> Sign {
        self * Sign::Minus
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

/// Sort `items` in place with a selection sort and return the parity of
/// the swaps performed.
///
/// The sort is not stable. On distinct elements the result is the sign of
/// the sorting permutation; with repeated elements it only records the
/// swaps this particular sort happened to make.
pub fn selection_sort<T: Ord>(items: &mut [T]) -> Sign {
    let mut sign = Sign::Plus;
    for i in 0..items.len() {
        let mut min = i;
        for j in (i + 1)..items.len() {
            if items[j] < items[min] {
                min = j;
            }
        }
        if min != i {
            items.swap(i, min);
            sign = -sign;
        }
    }
    sign
}

/// Sign of a permutation given in one-line notation.
pub fn permutation_sign(perm: &[usize]) -> Sign {
    let mut scratch = perm.to_vec();
    selection_sort(&mut scratch)
}

/// Inverse of a permutation in one-line notation.
pub fn inverse(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inv[p] = i;
    }
    inv
}

/// True iff `perm` is a permutation of `0..n`.
pub fn is_permutation(perm: &[usize], n: usize) -> bool {
    if perm.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &p in perm {
        if p >= n || seen[p] {
            return false;
        }
        seen[p] = true;
    }
    true
}

pub fn identity(n: usize) -> Vec<usize> {
    (0..n).collect()
}

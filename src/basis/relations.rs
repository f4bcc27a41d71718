//! Sparse integer matrices of linear relations between basis elements.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A sparse `num_rows × num_cols` matrix with `i64` entries. Row `i` is one
/// relation; column `j` is the basis element of index `j` in a graded piece.
///
/// Zero entries are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMatrix {
    num_rows: usize,
    num_cols: usize,
    entries: BTreeMap<(usize, usize), i64>,
}

impl RelationMatrix {
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self { num_rows, num_cols, entries: BTreeMap::new() }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.entries.get(&(row, col)).copied().unwrap_or(0)
    }

    /// # Panics
    ///
    /// If `(row, col)` is outside the matrix.
    pub fn set(&mut self, row: usize, col: usize, value: i64) {
        assert!(row < self.num_rows && col < self.num_cols, "entry ({row}, {col}) out of bounds");
        if value == 0 {
            self.entries.remove(&(row, col));
        } else {
            self.entries.insert((row, col), value);
        }
    }

    /// Add `value` to the entry at `(row, col)`.
    pub fn add(&mut self, row: usize, col: usize, value: i64) {
        let current = self.get(row, col);
        self.set(row, col, current + value);
    }

    /// Append an empty row and return its index.
    pub fn push_row(&mut self) -> usize {
        self.num_rows += 1;
        self.num_rows - 1
    }

    /// Non-zero entries of one row, by column.
    pub fn row(&self, row: usize) -> Vec<(usize, i64)> {
        self.entries
            .range((row, 0)..(row + 1, 0))
            .map(|(&(_, col), &value)| (col, value))
            .collect()
    }

    /// All non-zero entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, i64)> + '_ {
        self.entries.iter().map(|(&(row, col), &value)| (row, col, value))
    }

    pub fn to_dense(&self) -> Vec<Vec<i64>> {
        let mut dense = vec![vec![0; self.num_cols]; self.num_rows];
        for (row, col, value) in self.iter() {
            dense[row][col] = value;
        }
        dense
    }
}

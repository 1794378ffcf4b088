//! Sparse matrix blocks returned by the backward pass.
//!
//! Triplet (COO) storage is enough for the read-only gradient/Hessian blocks
//! this core hands out; duplicate entries are summed on densification.

use serde::{Deserialize, Serialize};

/// Sparse matrix in triplet form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    triplets: Vec<(usize, usize, f64)>,
}

impl SparseMatrix {
    /// Empty matrix of the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            triplets: Vec::new(),
        }
    }

    /// Matrix built from `(row, col, value)` triplets.
    ///
    /// Out-of-bounds triplets are dropped; duplicates are kept and summed
    /// when densified.
    pub fn from_triplets(
        rows: usize,
        cols: usize,
        triplets: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> Self {
        let triplets = triplets
            .into_iter()
            .filter(|&(r, c, _)| r < rows && c < cols)
            .collect();
        Self {
            rows,
            cols,
            triplets,
        }
    }

    /// Appends one entry; out-of-bounds entries are ignored.
    pub fn push(&mut self, row: usize, col: usize, value: f64) {
        if row < self.rows && col < self.cols {
            self.triplets.push((row, col, value));
        }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored entries (duplicates included).
    #[inline]
    pub fn nnz(&self) -> usize {
        self.triplets.len()
    }

    /// The raw triplets.
    pub fn triplets(&self) -> &[(usize, usize, f64)] {
        &self.triplets
    }

    /// Row-major dense expansion with duplicates summed.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.rows * self.cols];
        for &(r, c, v) in &self.triplets {
            dense[r * self.cols + c] += v;
        }
        dense
    }

    /// Value at `(row, col)` with duplicates summed.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.triplets
            .iter()
            .filter(|&&(r, c, _)| r == row && c == col)
            .map(|&(_, _, v)| v)
            .sum()
    }
}

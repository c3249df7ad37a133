//! Sparse matrix utilities for the assembly and solve kernels
//!
//! Global matrices are assembled in COO form and converted to CSR once per
//! batch. The direct solver stores the lower triangle in skyline form,
//! which suits the banded matrices produced by strip-like meshes.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{FeaError, FeaResult};

/// Incremental COO accumulator for element scatter
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(size: usize, capacity: usize) -> Self {
        Self {
            size,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Add a value; duplicates accumulate on conversion
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    /// Scatter a dense element matrix through its global DOF numbers
    pub fn add_element_matrix(&mut self, dofs: &[usize], local: &DMatrix<f64>) {
        for (i, &di) in dofs.iter().enumerate() {
            for (j, &dj) in dofs.iter().enumerate() {
                self.add(di, dj, local[(i, j)]);
            }
        }
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);
        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }
        CsrMatrix::from(&coo)
    }
}

/// Sparse matrix-vector product y = A x
pub fn matvec(csr: &CsrMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    let mut y = DVector::zeros(csr.nrows());
    let offsets = csr.row_offsets();
    let indices = csr.col_indices();
    let values = csr.values();
    for row in 0..csr.nrows() {
        let mut sum = 0.0;
        for idx in offsets[row]..offsets[row + 1] {
            sum += values[idx] * x[indices[idx]];
        }
        y[row] = sum;
    }
    y
}

/// Sparse-dense product Y = A X
pub fn mul_dense(csr: &CsrMatrix<f64>, x: &DMatrix<f64>) -> DMatrix<f64> {
    let mut y = DMatrix::zeros(csr.nrows(), x.ncols());
    let offsets = csr.row_offsets();
    let indices = csr.col_indices();
    let values = csr.values();
    for row in 0..csr.nrows() {
        for idx in offsets[row]..offsets[row + 1] {
            let (col, val) = (indices[idx], values[idx]);
            for k in 0..x.ncols() {
                y[(row, k)] += val * x[(col, k)];
            }
        }
    }
    y
}

/// A + factor * B over identical shapes
pub fn add_scaled(a: &CsrMatrix<f64>, b: &CsrMatrix<f64>, factor: f64) -> CsrMatrix<f64> {
    let mut coo = CooMatrix::new(a.nrows(), a.ncols());
    for (row, col, &val) in a.triplet_iter() {
        coo.push(row, col, val);
    }
    for (row, col, &val) in b.triplet_iter() {
        coo.push(row, col, factor * val);
    }
    CsrMatrix::from(&coo)
}

/// Extract the submatrix at the given row/column numbers
///
/// `rows` and `cols` are global equation numbers in their partition order;
/// the result has shape (rows.len(), cols.len()).
pub fn partition(matrix: &CsrMatrix<f64>, rows: &[usize], cols: &[usize]) -> CsrMatrix<f64> {
    let mut row_map = vec![usize::MAX; matrix.nrows()];
    for (new, &old) in rows.iter().enumerate() {
        row_map[old] = new;
    }
    let mut col_map = vec![usize::MAX; matrix.ncols()];
    for (new, &old) in cols.iter().enumerate() {
        col_map[old] = new;
    }

    let mut coo = CooMatrix::new(rows.len(), cols.len());
    for (row, col, &val) in matrix.triplet_iter() {
        let (r, c) = (row_map[row], col_map[col]);
        if r != usize::MAX && c != usize::MAX {
            coo.push(r, c, val);
        }
    }
    CsrMatrix::from(&coo)
}

/// Direct solver for symmetric positive definite sparse systems
///
/// Stores the lower triangle of the Cholesky factor in skyline form: one
/// row buffer per equation spanning from its first non-zero to the
/// diagonal.
pub struct SkylineCholesky {
    size: usize,
    rows: Vec<Vec<f64>>,
    heights: Vec<usize>,
}

impl SkylineCholesky {
    /// Copy the matrix into skyline storage and factorize in place
    pub fn factor(csr: &CsrMatrix<f64>) -> FeaResult<Self> {
        let size = csr.nrows();

        let mut heights = vec![0usize; size];
        for (row, col, _) in csr.triplet_iter() {
            if col < row && row - col > heights[row] {
                heights[row] = row - col;
            }
        }

        let mut rows: Vec<Vec<f64>> = heights.iter().map(|&h| vec![0.0; h + 1]).collect();
        for (row, col, &val) in csr.triplet_iter() {
            if col <= row {
                let start = row - heights[row];
                if col >= start {
                    rows[row][col - start] += val;
                }
            }
        }

        let mut solver = Self {
            size,
            rows,
            heights,
        };
        solver.factorize()?;
        Ok(solver)
    }

    fn factorize(&mut self) -> FeaResult<()> {
        for i in 0..self.size {
            let start_i = i - self.heights[i];

            for j in start_i..i {
                let start_j = j - self.heights[j];
                let start = start_i.max(start_j);

                let mut sum = 0.0;
                for k in start..j {
                    sum += self.get(i, k) * self.get(j, k);
                }

                let diag_j = self.rows[j][self.heights[j]];
                if diag_j.abs() < 1e-300 {
                    return Err(FeaError::SingularSystem);
                }
                let idx = j - start_i;
                self.rows[i][idx] = (self.rows[i][idx] - sum) / diag_j;
            }

            let mut sum = 0.0;
            for k in start_i..i {
                let val = self.get(i, k);
                sum += val * val;
            }
            let hi = self.heights[i];
            let diag = self.rows[i][hi] - sum;
            if diag <= 0.0 || !diag.is_finite() {
                return Err(FeaError::SingularSystem);
            }
            self.rows[i][hi] = diag.sqrt();
        }
        Ok(())
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> f64 {
        let start = row - self.heights[row];
        if col < start {
            0.0
        } else {
            self.rows[row][col - start]
        }
    }

    /// Solve L L' x = b
    pub fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        let mut x = b.clone();

        for i in 0..self.size {
            let start = i - self.heights[i];
            let mut sum = 0.0;
            for j in start..i {
                sum += self.get(i, j) * x[j];
            }
            x[i] = (x[i] - sum) / self.get(i, i);
        }

        for i in (0..self.size).rev() {
            x[i] /= self.get(i, i);
            let start = i - self.heights[i];
            for j in start..i {
                x[j] -= self.get(i, j) * x[i];
            }
        }

        x
    }
}

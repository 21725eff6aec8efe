//! Sparse matrix in standard Compressed Sparse Column (CSC) format.
//!
//! The solver treats the problem matrix as read-only: it is built once by the
//! caller and only ever multiplied against. Two derived operations live here
//! as well, the counting-sort `transpose` used to cache A' at setup, and the
//! gather-form product `accum_mul_transpose` that both matrix-vector passes
//! of the implicit operator reduce to.

use crate::error::NormCgError;
use num_traits::Float;

/// CSC sparse matrix with `m` rows and `n` columns.
///
/// `colptr` has length `n + 1`; the nonzeros of column `j` occupy
/// `rowval[colptr[j]..colptr[j+1]]` / `nzval[colptr[j]..colptr[j+1]]`.
/// Row indices within a column need not be sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// column pointers, length n + 1
    pub colptr: Vec<usize>,
    /// row index of each nonzero
    pub rowval: Vec<usize>,
    /// value of each nonzero
    pub nzval: Vec<T>,
}

impl<T: Float + Send + Sync> CscMatrix<T> {
    /// `CscMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary length checks and panics on failure. Row-index
    /// bounds and column-pointer monotonicity are left to `check_format`.
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// Validate the CSC structure: monotone column pointers, consistent
    /// lengths, and row indices in `[0, m)`.
    pub fn check_format(&self) -> Result<(), NormCgError> {
        if self.colptr.len() != self.n + 1 {
            return Err(NormCgError::BadFormat("colptr must have length n + 1"));
        }
        if self.colptr[0] != 0 {
            return Err(NormCgError::BadFormat("colptr must start at 0"));
        }
        if self.colptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(NormCgError::BadFormat("colptr must be non-decreasing"));
        }
        if self.colptr[self.n] != self.rowval.len() || self.rowval.len() != self.nzval.len() {
            return Err(NormCgError::BadFormat(
                "colptr[n], rowval and nzval lengths must agree",
            ));
        }
        if self.rowval.iter().any(|&i| i >= self.m) {
            return Err(NormCgError::BadFormat("row index out of bounds"));
        }
        Ok(())
    }

    /// Accumulate `y += A' x` where `A` is `self`.
    ///
    /// This is the gather form of the CSC product: output entry `j` sums the
    /// nonzeros of column `j` alone, so the loop partitions cleanly by output
    /// index and the Rayon path needs no synchronization.
    pub fn accum_mul_transpose(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.m, "Input vector x has incorrect length");
        assert_eq!(y.len(), self.n, "Output vector y has incorrect length");
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            y.par_iter_mut().enumerate().for_each(|(j, yj)| {
                let mut acc = *yj;
                for p in self.colptr[j]..self.colptr[j + 1] {
                    acc = acc + self.nzval[p] * x[self.rowval[p]];
                }
                *yj = acc;
            });
        }
        #[cfg(not(feature = "rayon"))]
        {
            for j in 0..self.n {
                let mut acc = y[j];
                for p in self.colptr[j]..self.colptr[j + 1] {
                    acc = acc + self.nzval[p] * x[self.rowval[p]];
                }
                y[j] = acc;
            }
        }
    }

    /// Build the transpose by counting sort: count nonzeros per row, prefix
    /// sum into the new column pointers, then scatter each entry into the
    /// next free slot of its destination column.
    pub fn transpose(&self) -> CscMatrix<T> {
        let nnz = self.nnz();
        let mut colptr = vec![0usize; self.m + 1];
        let mut rowval = vec![0usize; nnz];
        let mut nzval = vec![T::zero(); nnz];

        let mut next = vec![0usize; self.m];
        for &i in &self.rowval {
            next[i] += 1;
        }
        let mut sum = 0;
        for (ptr, cnt) in colptr.iter_mut().zip(next.iter_mut()) {
            *ptr = sum;
            sum += *cnt;
            *cnt = *ptr;
        }
        colptr[self.m] = sum;

        // `next` now holds the write cursor per destination column; distinct
        // source columns can hit the same cursor, so this loop must stay
        // serial (or be repartitioned by destination row before going wide).
        for j in 0..self.n {
            for p in self.colptr[j]..self.colptr[j + 1] {
                let q = next[self.rowval[p]];
                next[self.rowval[p]] += 1;
                rowval[q] = j;
                nzval[q] = self.nzval[p];
            }
        }

        CscMatrix {
            m: self.n,
            n: self.m,
            colptr,
            rowval,
            nzval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3x2 matrix [[1,0],[2,4],[0,3]] in CSC
    fn sample() -> CscMatrix<f64> {
        CscMatrix::new(3, 2, vec![0, 2, 4], vec![0, 1, 2, 1], vec![1.0, 2.0, 3.0, 4.0])
    }

    fn to_dense(a: &CscMatrix<f64>) -> Vec<Vec<f64>> {
        let mut d = vec![vec![0.0; a.n]; a.m];
        for j in 0..a.n {
            for p in a.colptr[j]..a.colptr[j + 1] {
                d[a.rowval[p]][j] += a.nzval[p];
            }
        }
        d
    }

    #[test]
    fn format_check_accepts_sample() {
        assert!(sample().check_format().is_ok());
    }

    #[test]
    fn format_check_rejects_bad_row_index() {
        let a = CscMatrix::new(2, 2, vec![0, 1, 2], vec![0, 5], vec![1.0, 1.0]);
        assert!(matches!(a.check_format(), Err(NormCgError::BadFormat(_))));
    }

    #[test]
    fn format_check_rejects_decreasing_colptr() {
        let a = CscMatrix {
            m: 2,
            n: 2,
            colptr: vec![0, 2, 1],
            rowval: vec![0, 1],
            nzval: vec![1.0, 1.0],
        };
        assert!(a.check_format().is_err());
    }

    #[test]
    fn gather_product_is_transpose_mul() {
        // A' * [1,1,1] = [3, 7]
        let a = sample();
        let mut y = vec![0.0; 2];
        a.accum_mul_transpose(&[1.0, 1.0, 1.0], &mut y);
        assert_eq!(y, vec![3.0, 7.0]);
        // accumulates on top of existing content
        a.accum_mul_transpose(&[1.0, 1.0, 1.0], &mut y);
        assert_eq!(y, vec![6.0, 14.0]);
    }

    #[test]
    fn transpose_preserves_every_entry() {
        let a = sample();
        let at = a.transpose();
        assert_eq!(at.m, a.n);
        assert_eq!(at.n, a.m);
        assert_eq!(at.nnz(), a.nnz());
        assert!(at.check_format().is_ok());
        let d = to_dense(&a);
        let dt = to_dense(&at);
        for i in 0..a.m {
            for j in 0..a.n {
                assert_eq!(d[i][j], dt[j][i]);
            }
        }
    }

    #[test]
    fn transpose_of_empty_rows() {
        // 0 x 2 matrix: transpose is 2 x 0 with a single colptr entry
        let a = CscMatrix::<f64>::new(0, 2, vec![0, 0, 0], vec![], vec![]);
        let at = a.transpose();
        assert_eq!((at.m, at.n), (2, 0));
        assert_eq!(at.colptr, vec![0]);
    }
}

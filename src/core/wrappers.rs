//! Trait implementations for slices and faer dense matrices.
//!
//! The inner product for `()` is the crate-wide reduction primitive, with
//! optional Rayon parallelism. The `MatVec` impl for `faer::Mat` lets the CG
//! kernel run against a dense reference operator, which the tests use to
//! cross-check the matrix-free path.

use crate::core::traits::{InnerProduct, MatVec};
use faer::Mat;
use num_traits::Float;

/// Implements matrix-vector multiplication for `faer::Mat`.
///
/// Computes `y = A * x` where `A` is a dense matrix, `x` and `y` are slices.
impl<T: Float> MatVec<T> for Mat<T> {
    fn matvec(&mut self, x: &[T], y: &mut [T]) {
        assert_eq!(self.ncols(), x.len(), "Input vector x has incorrect length");
        assert_eq!(self.nrows(), y.len(), "Output vector y has incorrect length");
        for i in 0..self.nrows() {
            y[i] = T::zero();
            for j in 0..self.ncols() {
                y[i] = y[i] + self[(i, j)] * x[j];
            }
        }
    }
}

/// Inner product and norm for slices, with optional Rayon parallelism.
impl<T: Float + Send + Sync> InnerProduct<[T]> for () {
    type Scalar = T;

    /// Computes the dot product of two slices: `x^T y`.
    fn dot(&self, x: &[T], y: &[T]) -> T {
        assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            x.par_iter()
                .zip(y.par_iter())
                .map(|(xi, yi)| *xi * *yi)
                .reduce(|| T::zero(), |acc, v| acc + v)
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.iter()
                .zip(y.iter())
                .map(|(xi, yi)| *xi * *yi)
                .fold(T::zero(), |acc, v| acc + v)
        }
    }

    /// Computes the Euclidean norm of a slice: `||x||_2`.
    fn norm(&self, x: &[T]) -> T {
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            x.par_iter()
                .map(|xi| *xi * *xi)
                .reduce(|| T::zero(), |acc, v| acc + v)
                .sqrt()
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.iter()
                .map(|xi| *xi * *xi)
                .fold(T::zero(), |acc, v| acc + v)
                .sqrt()
        }
    }
}

//! Matrix-free operator for the shifted normal equations.

use crate::core::traits::MatVec;
use crate::matrix::CscMatrix;
use num_traits::Float;

/// Applies y = rho·x + A'(A x) without forming A'A.
///
/// Both passes use the gather product: `A x` gathers over the columns of the
/// cached transpose, `A'·` gathers over the columns of A itself. The m-length
/// scratch between the two passes is borrowed exclusively for the lifetime of
/// the operator, which is why `matvec` takes `&mut self`.
pub struct NormalOperator<'a, T> {
    a: &'a CscMatrix<T>,
    at: &'a CscMatrix<T>,
    rho: T,
    tmp: &'a mut [T],
}

impl<'a, T: Float + Send + Sync> NormalOperator<'a, T> {
    pub fn new(a: &'a CscMatrix<T>, at: &'a CscMatrix<T>, rho: T, tmp: &'a mut [T]) -> Self {
        assert_eq!(at.m, a.n);
        assert_eq!(at.n, a.m);
        assert_eq!(tmp.len(), a.m, "scratch must have one entry per row of A");
        Self { a, at, rho, tmp }
    }
}

impl<T: Float + Send + Sync> MatVec<T> for NormalOperator<'_, T> {
    fn matvec(&mut self, x: &[T], y: &mut [T]) {
        self.tmp.fill(T::zero());
        self.at.accum_mul_transpose(x, self.tmp); // tmp = A x
        y.fill(T::zero());
        self.a.accum_mul_transpose(self.tmp, y); // y = A' tmp
        for (yi, &xi) in y.iter_mut().zip(x) {
            *yi = *yi + self.rho * xi;
        }
    }
}

// Jacobi preconditioner for the shifted normal equations

use crate::matrix::CscMatrix;
use crate::preconditioner::Preconditioner;
use num_traits::Float;

/// Jacobi preconditioner: M⁻¹ = diag(rho·I + A'A)⁻¹.
///
/// The diagonal of A'A is the squared norm of each column of A, so the whole
/// inverse diagonal comes straight from the CSC column slices. With rho > 0
/// every entry is strictly positive.
pub struct Jacobi<T> {
    pub(crate) inv_diag: Vec<T>,
}

impl<T: Float + Send + Sync> Jacobi<T> {
    /// Build the inverse diagonal from A's column norms and the shift.
    pub fn from_normal_diagonal(a: &CscMatrix<T>, rho: T) -> Self {
        let inv_diag = (0..a.n)
            .map(|j| {
                let col = &a.nzval[a.colptr[j]..a.colptr[j + 1]];
                let normsq = col.iter().fold(T::zero(), |acc, &v| acc + v * v);
                T::one() / (rho + normsq)
            })
            .collect();
        Self { inv_diag }
    }
}

impl<T: Float> Preconditioner<T> for Jacobi<T> {
    fn apply(&self, r: &[T], z: &mut [T]) {
        for i in 0..r.len() {
            z[i] = self.inv_diag[i] * r[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_columns_with_unit_shift() {
        // A = 2x2 identity, rho = 1 -> inverse diagonal [0.5, 0.5]
        let a = CscMatrix::new(2, 2, vec![0, 1, 2], vec![0, 1], vec![1.0, 1.0]);
        let pc = Jacobi::from_normal_diagonal(&a, 1.0);
        assert_eq!(pc.inv_diag, vec![0.5, 0.5]);
        let mut z = vec![0.0; 2];
        pc.apply(&[2.0, 4.0], &mut z);
        assert_eq!(z, vec![1.0, 2.0]);
    }

    #[test]
    fn empty_column_uses_shift_alone() {
        // second column has no nonzeros
        let a = CscMatrix::new(2, 2, vec![0, 2, 2], vec![0, 1], vec![3.0, 4.0]);
        let pc = Jacobi::from_normal_diagonal(&a, 2.0);
        assert_eq!(pc.inv_diag, vec![1.0 / 27.0, 0.5]);
    }
}

//! Preconditioned Conjugate Gradient per Saad §9.2, specialized to the
//! in-place, warm-started form the solve orchestrator needs.
//!
//! The kernel solves `Op·x = b` for a symmetric positive-definite operator
//! and writes the result back into the buffer that held `b`. An optional
//! warm start seeds the iterate; the preconditioned residual, direction and
//! operator-output vectors come from a caller-owned `CgWorkspace` so that
//! repeated calls reuse the same allocations.

use crate::core::traits::{InnerProduct, MatVec};
use crate::preconditioner::Preconditioner;
use crate::utils::convergence::Convergence;
use num_traits::Float;

/// CG scratch vectors, all of the system dimension n.
///
/// Contents are overwritten on every solve; only the allocation is reused.
pub struct CgWorkspace<T> {
    p: Vec<T>,
    r: Vec<T>,
    ap: Vec<T>,
    z: Vec<T>,
}

impl<T: Float> CgWorkspace<T> {
    pub fn new(n: usize) -> Self {
        Self {
            p: vec![T::zero(); n],
            r: vec![T::zero(); n],
            ap: vec![T::zero(); n],
            z: vec![T::zero(); n],
        }
    }

    pub fn dim(&self) -> usize {
        self.p.len()
    }
}

pub struct PcgSolver<T> {
    pub conv: Convergence<T>,
}

impl<T: Float + Send + Sync> PcgSolver<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self {
            conv: Convergence { tol, max_iters },
        }
    }

    /// Approximately solve `Op·x = b`, overwriting `b` with x.
    ///
    /// With no warm start the iterate begins at zero and the residual is `b`
    /// itself; with warm start `s` the residual is `b − Op(s)` and the
    /// iterate begins at `s`. Returns the number of iterations performed.
    /// Hitting the budget is not a failure: `b` always holds the best
    /// iterate found. If the curvature term ⟨p, Op·p⟩ is not strictly
    /// positive the iteration has broken down (or the residual was already
    /// exactly zero) and the current iterate is returned as-is.
    pub fn solve_in_place<M: MatVec<T>>(
        &self,
        op: &mut M,
        pc: &dyn Preconditioner<T>,
        b: &mut [T],
        warm: Option<&[T]>,
        work: &mut CgWorkspace<T>,
    ) -> usize {
        let n = b.len();
        assert_eq!(work.dim(), n, "workspace dimension must match the system");
        let ip = ();
        let CgWorkspace { p, r, ap, z } = work;
        let (p, r, ap, z) = (&mut p[..], &mut r[..], &mut ap[..], &mut z[..]);

        match warm {
            None => {
                r.copy_from_slice(b);
                b.fill(T::zero());
            }
            Some(s) => {
                assert_eq!(s.len(), n, "warm start must have the system dimension");
                op.matvec(s, r);
                for (ri, &bi) in r.iter_mut().zip(b.iter()) {
                    *ri = bi - *ri;
                }
                b.copy_from_slice(s);
            }
        }

        pc.apply(r, z);
        let mut ipzr = ip.dot(&z[..], &r[..]);
        p.copy_from_slice(z);

        for i in 0..self.conv.max_iters {
            op.matvec(p, ap);
            let curvature = ip.dot(&p[..], &ap[..]);
            if !(curvature > T::zero()) {
                return i;
            }
            let alpha = ipzr / curvature;
            for (bj, &pj) in b.iter_mut().zip(p.iter()) {
                *bj = *bj + alpha * pj;
            }
            for (rj, &apj) in r.iter_mut().zip(ap.iter()) {
                *rj = *rj - alpha * apj;
            }
            if ip.norm(&r[..]) < self.conv.tol {
                return i + 1;
            }
            let ipzr_old = ipzr;
            pc.apply(r, z);
            ipzr = ip.dot(&z[..], &r[..]);
            let beta = ipzr / ipzr_old;
            for (pj, &zj) in p.iter_mut().zip(z.iter()) {
                *pj = zj + beta * *pj;
            }
        }
        self.conv.max_iters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preconditioner::Jacobi;
    use crate::matrix::CscMatrix;
    use crate::core::operator::NormalOperator;
    use faer::Mat;

    struct IdentityPc;
    impl Preconditioner<f64> for IdentityPc {
        fn apply(&self, r: &[f64], z: &mut [f64]) {
            z.copy_from_slice(r);
        }
    }

    #[test]
    fn solves_shifted_identity_in_one_iteration() {
        // A = 2x2 identity, rho = 1 -> operator is 2I; (2I)x = [2,2] -> x = [1,1]
        let a = CscMatrix::new(2, 2, vec![0, 1, 2], vec![0, 1], vec![1.0, 1.0]);
        let at = a.transpose();
        let pc = Jacobi::from_normal_diagonal(&a, 1.0);
        let mut tmp = vec![0.0; 2];
        let mut op = NormalOperator::new(&a, &at, 1.0, &mut tmp);
        let mut work = CgWorkspace::new(2);
        let solver = PcgSolver::new(1e-10, 2);
        let mut b = vec![2.0, 2.0];
        let iters = solver.solve_in_place(&mut op, &pc, &mut b, None, &mut work);
        assert_eq!(iters, 1);
        assert!((b[0] - 1.0).abs() < 1e-12);
        assert!((b[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn exact_warm_start_terminates_immediately() {
        let a = CscMatrix::new(2, 2, vec![0, 1, 2], vec![0, 1], vec![1.0, 1.0]);
        let at = a.transpose();
        let pc = Jacobi::from_normal_diagonal(&a, 1.0);
        let mut tmp = vec![0.0; 2];
        let mut op = NormalOperator::new(&a, &at, 1.0, &mut tmp);
        let mut work = CgWorkspace::new(2);
        let solver = PcgSolver::new(1e-10, 2);
        let mut b = vec![2.0, 2.0];
        let exact = [1.0, 1.0];
        let iters = solver.solve_in_place(&mut op, &pc, &mut b, Some(&exact), &mut work);
        assert!(iters <= 1);
        assert_eq!(b, vec![1.0, 1.0]);
    }

    #[test]
    fn dense_operator_matches_known_solution() {
        // [[4,1],[1,3]] x = [1,2] -> x = [1/11, 7/11]
        let mut a = Mat::<f64>::zeros(2, 2);
        a[(0, 0)] = 4.0;
        a[(0, 1)] = 1.0;
        a[(1, 0)] = 1.0;
        a[(1, 1)] = 3.0;
        let mut work = CgWorkspace::new(2);
        let solver = PcgSolver::new(1e-12, 20);
        let mut b = vec![1.0, 2.0];
        let iters = solver.solve_in_place(&mut a, &IdentityPc, &mut b, None, &mut work);
        assert!(iters <= 2);
        assert!((b[0] - 0.09090909090909091).abs() < 1e-8);
        assert!((b[1] - 0.6363636363636364).abs() < 1e-8);
    }

    #[test]
    fn budget_exhaustion_returns_best_iterate() {
        let mut a = Mat::<f64>::zeros(2, 2);
        a[(0, 0)] = 4.0;
        a[(0, 1)] = 1.0;
        a[(1, 0)] = 1.0;
        a[(1, 1)] = 3.0;
        let mut work = CgWorkspace::new(2);
        let solver = PcgSolver::new(1e-30, 1);
        let mut b = vec![1.0, 2.0];
        let iters = solver.solve_in_place(&mut a, &IdentityPc, &mut b, None, &mut work);
        assert_eq!(iters, 1);
        // one step still makes progress from the zero iterate
        assert!(b.iter().any(|&v| v != 0.0));
    }
}

//! Solver handle for the indirect (iterative) linear-system core.
//!
//! `IndirectContext` owns everything derived from the problem matrix: the
//! cached transpose, the Jacobi diagonal, the CG workspace and the running
//! statistics. The surrounding optimizer constructs one per problem, calls
//! [`IndirectContext::solve`] once per outer iteration, and reads the
//! diagnostics through `Display` and [`IndirectContext::summary`]. Dropping
//! the context releases all owned buffers.

use std::fmt;
use std::time::Instant;

use crate::config::{Settings, Verbosity};
use crate::core::operator::NormalOperator;
use crate::core::traits::InnerProduct;
use crate::error::NormCgError;
use crate::matrix::CscMatrix;
use crate::preconditioner::Jacobi;
use crate::solver::{CgWorkspace, PcgSolver};
use crate::utils::convergence::ToleranceSchedule;
use crate::utils::stats::RunningStats;

/// Per-solver scratch: the CG vectors plus the m-length buffer the implicit
/// operator accumulates `A x` into. Allocated once, reused every call.
struct Workspace<T> {
    cg: CgWorkspace<T>,
    tmp: Vec<T>,
}

/// Iterative solver for the coupled block system built on the regularized
/// normal equations `(rho·I + A'A) x = b`.
///
/// The matrix is borrowed and never modified; it may be shared read-only
/// with other contexts. One context must not be driven from multiple
/// threads at once, since the scratch buffers are reused without locking.
pub struct IndirectContext<'a, T> {
    a: &'a CscMatrix<T>,
    at: CscMatrix<T>,
    precond: Jacobi<T>,
    schedule: ToleranceSchedule<T>,
    settings: Settings<T>,
    work: Workspace<T>,
    stats: RunningStats,
}

impl<'a, T: num_traits::Float + From<f64> + Send + Sync> IndirectContext<'a, T> {
    /// Build the transpose cache, preconditioner and workspace for `a`.
    ///
    /// Fails if the matrix is structurally malformed or `rho` is not
    /// strictly positive; nothing is retained on failure.
    pub fn new(a: &'a CscMatrix<T>, settings: Settings<T>) -> Result<Self, NormCgError> {
        a.check_format()?;
        if settings.rho <= T::zero() {
            return Err(NormCgError::NonPositiveShift);
        }
        if settings.verbosity.contains(Verbosity::SETUP) {
            eprintln!("transposing A ({} nonzeros)", a.nnz());
        }
        let at = a.transpose();
        if settings.verbosity.contains(Verbosity::SETUP) {
            eprintln!("building diagonal preconditioner");
        }
        let precond = Jacobi::from_normal_diagonal(a, settings.rho);
        let schedule = ToleranceSchedule::new(settings.cg_rate);
        let work = Workspace {
            cg: CgWorkspace::new(a.n),
            tmp: vec![T::zero(); a.m],
        };
        Ok(Self {
            a,
            at,
            precond,
            schedule,
            settings,
            work,
            stats: RunningStats::default(),
        })
    }

    /// Solve the coupled block system for the stacked right-hand side
    /// `b = [b1; b2]` of length n + m.
    ///
    /// The buffer is consumed in place: on return it holds the solution
    /// blocks instead of the right-hand side. `warm`, if given, seeds the CG
    /// iterate for the n-block. A negative `outer_iter` requests the
    /// high-precision tolerance floor; non-negative indices follow the
    /// loosened schedule and count toward the iteration statistics. Returns
    /// the CG iterations used.
    pub fn solve(&mut self, b: &mut [T], warm: Option<&[T]>, outer_iter: i32) -> usize {
        let (n, m) = (self.a.n, self.a.m);
        assert_eq!(b.len(), n + m, "combined buffer must have length n + m");
        let start = Instant::now();
        let ip = ();

        if self.settings.verbosity.contains(Verbosity::SOLVE) {
            eprintln!("solving linear system (outer iteration {outer_iter})");
        }

        let (b1, b2) = b.split_at_mut(n);
        let tol = self.schedule.tolerance(ip.norm(&b1[..]), outer_iter);

        // reduce the coupled system to the normal equations: b1 += A' b2
        self.a.accum_mul_transpose(b2, b1);

        let budget = self.settings.max_cg_iters.unwrap_or(n);
        let pcg = PcgSolver::new(tol, budget);
        let mut op = NormalOperator::new(self.a, &self.at, self.settings.rho, &mut self.work.tmp);
        let iters = pcg.solve_in_place(&mut op, &self.precond, b1, warm, &mut self.work.cg);

        // back-substitute the m-block: b2 := A x - b2
        for v in b2.iter_mut() {
            *v = -*v;
        }
        self.at.accum_mul_transpose(b1, b2);

        if self.settings.verbosity.contains(Verbosity::CG) {
            eprintln!("CG iterations: {iters}");
        }
        if outer_iter >= 0 {
            self.stats.cg_iters += iters;
        }
        self.stats.solve_time += start.elapsed();
        iters
    }

    /// Average CG iterations and solve time per call since the last summary,
    /// averaged over `total_outer_iters + 1` calls. Resets both running
    /// totals.
    pub fn summary(&mut self, total_outer_iters: usize) -> String {
        let (avg_iters, avg_time) = self.stats.averages(total_outer_iters);
        format!(
            "lin-sys: avg cg iterations: {:.2}, avg solve time: {:.2e}s",
            avg_iters,
            avg_time.as_secs_f64()
        )
    }

    /// System dimension n of the reduced solve.
    pub fn dim(&self) -> usize {
        self.a.n
    }
}

impl<T: num_traits::Float + fmt::Display + Send + Sync> fmt::Display for IndirectContext<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sparse-indirect, nnz in A = {}, CG tol ~ 1/iter^({:.2})",
            self.a.nnz(),
            self.settings.cg_rate
        )
    }
}

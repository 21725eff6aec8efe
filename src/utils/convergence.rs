//! Stopping criteria and the outer-iteration tolerance schedule.

use num_traits::Float;

/// Absolute residual tolerance and iteration budget for one CG run.
pub struct Convergence<T> {
    pub tol: T,
    pub max_iters: usize,
}

/// Maps the outer-iteration index to a CG tolerance.
///
/// Early outer iterations only need a rough subproblem solution, so the
/// tolerance starts loose and tightens as 1/(iter+1)^rate. A negative index
/// signals a final high-precision solve and drops straight to the floor.
/// The returned tolerance is `max(rhs_norm * tau, floor)` so it scales with
/// the right-hand side but never chases zero.
pub struct ToleranceSchedule<T> {
    pub rate: T,
    pub floor: T,
}

/// Tolerance floor matching the reference solver.
const BEST_TOL: f64 = 1e-7;

impl<T: Float + From<f64>> ToleranceSchedule<T> {
    pub fn new(rate: T) -> Self {
        Self {
            rate,
            floor: BEST_TOL.into(),
        }
    }

    pub fn tolerance(&self, rhs_norm: T, outer_iter: i32) -> T {
        let tau = if outer_iter < 0 {
            self.floor
        } else {
            let k: T = ((outer_iter + 1) as f64).into();
            T::one() / k.powf(self.rate)
        };
        (rhs_norm * tau).max(self.floor)
    }
}

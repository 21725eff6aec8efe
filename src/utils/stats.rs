//! Running totals reported through the diagnostics interface.

use std::time::Duration;

/// Accumulated CG iterations and wall time since the last summary.
///
/// Owned by the solver handle rather than living in globals; the summary
/// call is the only reader and resets both totals as a side effect.
#[derive(Debug, Default)]
pub struct RunningStats {
    pub cg_iters: usize,
    pub solve_time: Duration,
}

impl RunningStats {
    /// Averages over `total_outer_iters + 1` calls (the index is 0-based),
    /// then resets the totals.
    pub fn averages(&mut self, total_outer_iters: usize) -> (f64, Duration) {
        let calls = (total_outer_iters + 1) as u32;
        let avg_iters = self.cg_iters as f64 / f64::from(calls);
        let avg_time = self.solve_time / calls;
        self.cg_iters = 0;
        self.solve_time = Duration::ZERO;
        (avg_iters, avg_time)
    }
}

//! Convergence control and running statistics.

pub mod convergence;
pub mod stats;

pub use convergence::{Convergence, ToleranceSchedule};
pub use stats::RunningStats;

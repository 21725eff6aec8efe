//! Run-fixed configuration for the indirect solver.

pub mod options;
pub use options::{Settings, Verbosity};

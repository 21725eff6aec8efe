//! Core traits and the matrix-free normal-equations operator.

pub mod traits;
pub mod wrappers;
pub mod operator;

pub use operator::NormalOperator;
pub use traits::{InnerProduct, MatVec};

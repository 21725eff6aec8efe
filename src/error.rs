use thiserror::Error;

// Unified error type for normcg

#[derive(Error, Debug)]
pub enum NormCgError {
    #[error("sparse matrix format error: {0}")]
    BadFormat(&'static str),
    #[error("regularization weight rho must be strictly positive")]
    NonPositiveShift,
}

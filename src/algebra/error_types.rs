use thiserror::Error;

/// Error type returned by dense factorization routines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DenseFactorizationError {
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    #[error("Cholesky factorization failed: non-positive pivot in column {0}")]
    Cholesky(usize),
}

use std::collections::TryReserveError;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the buffer layer. Every variant is raised synchronously by the call that caused it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The buffer or description was already released
    #[error("object has already been released")]
    InvalidState,
    #[error("failed to allocate security buffer storage")]
    AllocationFailure(#[from] TryReserveError),
}

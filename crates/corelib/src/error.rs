//! Core errors (renderer-agnostic).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// An argument violated a documented precondition (zero world size, degenerate polygon, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Generic error: {0}")]
    Generic(String),
}

impl CoreError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

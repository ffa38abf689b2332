//! Core error type.

use thiserror::Error;

/// Errors produced by `drive-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorthand result type for `drive-core`.
pub type CoreResult<T> = Result<T, CoreError>;

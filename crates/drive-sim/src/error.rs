use drive_core::CoreError;
use drive_path::PathError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("speed must be a positive finite number, got {0}")]
    InvalidSpeed(f64),

    #[error("listener is absent")]
    InvalidListener,

    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;

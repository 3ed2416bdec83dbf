//! Error types for eld-io

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("No snapshot recorded for step {step}")]
    MissingSnapshot { step: usize },

    #[error("Dataset function mismatch: expected '{expected}', file has '{found}'")]
    FunctionMismatch { expected: String, found: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

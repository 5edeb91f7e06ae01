//! Error types for the bundle model

use std::io;
use thiserror::Error;

/// Model error type
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Top-level object is '{found}', expected 'bundle'")]
    NotABundle { found: String },

    #[error("Opinion {opinion_id} references unknown creator '{identity_ref}'")]
    UnknownCreator {
        opinion_id: String,
        identity_ref: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ModelError>;

//! Error types for trellis-model.

use thiserror::Error;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while loading or indexing a model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Failed to read the model file.
    #[error("Failed to read model file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse the JSON model.
    #[error("Failed to parse model JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    /// Two classes share a name.
    #[error("Duplicate class in model: {0}")]
    DuplicateClass(String),
}

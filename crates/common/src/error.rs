//! Error types for storefront test logic

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the storefront Error
pub type Result<T> = std::result::Result<T, Error>;

/// Storefront error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ENV file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot parse price {text:?}")]
    PriceParse { text: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Field {field} should be {expected}, got {actual}")]
    FieldType {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Listing mismatch: {0}")]
    Listing(String),
}

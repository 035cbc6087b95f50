//! Custom error types for kwindex
//!
//! Uses thiserror for ergonomic error definitions with automatic
//! Display and Error trait implementations.

use std::path::PathBuf;
use thiserror::Error;

/// Application-specific errors for kwindex
#[derive(Error, Debug)]
pub enum KwindexError {
    /// IO operations failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scan root directory does not exist
    #[error("Scan root not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A document referenced no known keyword at all
    #[error(
        "No known keyword found in {}. \
         Either register an alias for an existing keyword in the index, \
         or fix the file so it references known keywords.",
        .path.display()
    )]
    NoKeywordsFound {
        /// Document that failed extraction
        path: PathBuf,
    },

    /// A name resolves to nothing in the keyword index
    #[error("Unknown keyword: {keyword}")]
    UnknownKeyword {
        /// The unresolvable name
        keyword: String,
    },

    /// YAML serialization/deserialization failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, KwindexError>;

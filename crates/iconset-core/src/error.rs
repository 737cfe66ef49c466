//! Error types for the iconset library.
//!
//! Recoverable conditions met during a scan (a declared icon whose file is
//! missing, a failed lookup) are logged and recorded rather than raised. The
//! variants here are the structural and permission failures a caller is
//! expected to branch on.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the iconset library.
#[derive(Debug, Error)]
pub enum IconError {
    // Session errors
    #[error("No directory handle was provided")]
    NoDirectoryHandle,

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    // Serialization errors
    #[error("Failed to parse metadata file {path}: {message}")]
    MetadataParse {
        path: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Catalog errors
    #[error("Icon not found: {id}")]
    IconNotFound { id: String },

    #[error("Icon id already used in category {category}: {id}")]
    DuplicateIcon { category: String, id: String },

    // Lookup errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Icon lookup failed for {id}: {message}")]
    Lookup { id: String, message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for iconset operations.
pub type Result<T> = std::result::Result<T, IconError>;

impl From<std::io::Error> for IconError {
    fn from(err: std::io::Error) -> Self {
        IconError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for IconError {
    fn from(err: serde_json::Error) -> Self {
        IconError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for IconError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            IconError::Timeout(std::time::Duration::from_secs(0))
        } else {
            IconError::Network {
                message: err.to_string(),
                cause: Some(err.to_string()),
            }
        }
    }
}

impl IconError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => IconError::FileNotFound(path),
            std::io::ErrorKind::PermissionDenied => IconError::PermissionDenied(path),
            _ => IconError::Io {
                message: err.to_string(),
                path: Some(path),
                source: Some(err),
            },
        }
    }

    /// Create a metadata parse error for the file at `path`.
    pub fn metadata_parse(path: impl Into<String>, err: serde_json::Error) -> Self {
        IconError::MetadataParse {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Whether this error came from directory selection or permission checks.
    pub fn is_permission_error(&self) -> bool {
        matches!(
            self,
            IconError::NoDirectoryHandle | IconError::PermissionDenied(_)
        )
    }

    /// Check if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IconError::Network { .. } | IconError::Timeout(_))
    }
}

//! Error types for the marker-store crate

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for marker store operations
pub type Result<T> = std::result::Result<T, MarkerStoreError>;

/// Failures raised while reading or writing diagnostics
#[derive(Error, Debug)]
pub enum MarkerStoreError {
    /// IO operations failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to create data directory
    #[error("Failed to create data directory: {path:?}")]
    DataDirectoryCreationFailed { path: PathBuf },

    /// Failed to determine system data directory
    #[error("Failed to determine system data directory")]
    SystemDataDirectoryNotFound,

    /// A thread panicked while holding one of the store locks
    #[error("Marker store lock poisoned: {0}")]
    LockPoisoned(&'static str),

    /// The backing store refused a write for one file
    #[error("Marker store rejected write for {path}: {reason}")]
    Rejected { path: String, reason: String },
}

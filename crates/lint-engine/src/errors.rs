use marker_store::MarkerStoreError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Rejected configuration. The previously active configuration stays in effect.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error(
        "Invalid exclusion pattern '{fragment}' (pattern #{index} at offset {offset}): {source}"
    )]
    InvalidExclusionPattern {
        fragment: String,
        /// 0-based index of the fragment in the comma separated list
        index: usize,
        /// Byte offset of the fragment in the exclusion text
        offset: usize,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("Invalid preferences file {path:?}: {message}")]
    InvalidPreferences {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Unsupported value for preference '{key}': {message}")]
    UnsupportedPreferenceValue { key: String, message: String },
}

/// Failure reported by an analyzer implementation
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Analyzer process failed: {0}")]
    Process(String),

    #[error("Analyzer timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed analyzer output: {0}")]
    Output(String),

    #[error("{0}")]
    Message(String),
}

impl AnalyzerError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Per-file read or lint failure; the file is left without diagnostics for this pass.
#[derive(Error, Debug)]
pub enum AnalysisFailure {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path} as {encoding}: {message}")]
    Decode {
        path: String,
        encoding: String,
        message: String,
    },

    #[error("Skipped {path}: file larger than the {limit} byte limit")]
    TooLarge { path: String, limit: usize },

    #[error("Failed to construct analyzer: {0}")]
    AnalyzerUnavailable(#[source] AnalyzerError),

    #[error("Analysis of {path} failed: {source}")]
    Analyzer {
        path: String,
        #[source]
        source: AnalyzerError,
    },
}

/// A diagnostic write or clear failed for one file.
#[derive(Error, Debug)]
#[error("Failed to update diagnostics for {path}: {source}")]
pub struct MarkerStoreFailure {
    pub path: String,
    #[source]
    pub source: MarkerStoreError,
}

/// Everything that can go wrong while reconciling a single file
#[derive(Error, Debug)]
pub enum ReconcileFailure {
    #[error(transparent)]
    Analysis(#[from] AnalysisFailure),

    #[error(transparent)]
    MarkerStore(#[from] MarkerStoreFailure),
}

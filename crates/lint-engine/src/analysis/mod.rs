//! The analyzer capability and its session-wide cache.
//!
//! The engine never lints JavaScript itself. An [`Analyzer`] is configured option
//! by option from a [`ConfigurationSnapshot`](crate::configuration::ConfigurationSnapshot)
//! and then asked for the issues of one file's content at a time.

pub mod cache;
pub mod process;

use crate::configuration::OptionValue;
use crate::errors::AnalyzerError;
use serde::{Deserialize, Serialize};

pub use cache::{AnalyzerCache, AnalyzerHandle};
pub use process::{ProcessAnalyzer, ProcessAnalyzerConfig};

/// One problem reported by an analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// 1-based line, 0 when the issue has no specific line
    pub line: u32,
    pub message: String,
}

impl Issue {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Result of applying one option to an analyzer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionOutcome {
    Applied,
    /// The analyzer has no such option
    Unrecognized,
    /// The option exists but the value was refused
    Rejected(String),
}

pub trait Analyzer: Send + Sync {
    /// Return every option to the analyzer's built-in default
    fn reset_options(&mut self);

    fn set_option(&mut self, name: &str, value: &OptionValue) -> OptionOutcome;

    fn analyze(&self, path: &str, content: &str) -> Result<Vec<Issue>, AnalyzerError>;
}

/// Creates fresh, unconfigured analyzers for the cache.
pub trait AnalyzerFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn Analyzer>, AnalyzerError>;
}

impl<F> AnalyzerFactory for F
where
    F: Fn() -> Result<Box<dyn Analyzer>, AnalyzerError> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn Analyzer>, AnalyzerError> {
        self()
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which traversal a build used
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Full,
    Incremental,
    Clean,
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Full => write!(f, "full"),
            BuildMode::Incremental => write!(f, "incremental"),
            BuildMode::Clean => write!(f, "clean"),
        }
    }
}

/// Per-build counters carried by completion and cancellation events
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct BuildSummary {
    /// Files whose diagnostics were recomputed
    pub files_linted: usize,
    /// Removed files and folders whose diagnostics were dropped without analysis
    pub files_cleared: usize,
    /// Source files skipped by the exclusion rules
    pub files_excluded: usize,
    /// Files whose analysis or marker update failed
    pub files_failed: usize,
    /// Diagnostics recorded during the build
    pub diagnostics: usize,
}

impl BuildSummary {
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}

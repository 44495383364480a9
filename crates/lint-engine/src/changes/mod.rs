pub mod classifier;

use crate::project::file::FileRef;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use classifier::{
    CandidateSelector, ChangeClassifier, Classification, DeltaTraversal, FullTraversal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Changed,
    Removed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "added"),
            ChangeKind::Changed => write!(f, "changed"),
            ChangeKind::Removed => write!(f, "removed"),
        }
    }
}

/// A file touched since the last build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub file: FileRef,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(file: FileRef, kind: ChangeKind) -> Self {
        Self { file, kind }
    }

    pub fn path(&self) -> &str {
        self.file.path()
    }

    pub fn is_removal(&self) -> bool {
        self.kind == ChangeKind::Removed
    }
}

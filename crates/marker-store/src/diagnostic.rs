use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Marker type under which lint findings are recorded.
pub const MARKER_TYPE: &str = "jslint4java.javaScriptLintProblem";

/// Source id attached to every diagnostic produced by the lint builder.
pub const DIAGNOSTIC_SOURCE_ID: &str = "jslint4java";

/// Severity of a recorded diagnostic. Lint findings are always warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A recorded lint finding attached to a file and a line
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Workspace-relative path of the owning file
    pub path: String,
    /// 1-based line number, `0` when the finding has no specific line
    pub line: u32,
    pub message: String,
    pub severity: Severity,
    pub source_id: String,
}

impl Diagnostic {
    pub fn warning(path: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line,
            message: message.into(),
            severity: Severity::Warning,
            source_id: DIAGNOSTIC_SOURCE_ID.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.path, self.line, self.severity, self.message
        )
    }
}

/// How far a clear request reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    /// Only diagnostics owned by exactly this path
    File,
    /// This path and everything below it; an empty path covers the whole store
    Descendants,
}

impl ClearScope {
    pub fn covers(&self, scope_path: &str, path: &str) -> bool {
        match self {
            ClearScope::File => scope_path == path,
            ClearScope::Descendants => {
                let prefix = scope_path.trim_end_matches('/');
                prefix.is_empty()
                    || path == prefix
                    || path
                        .strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

/// Diagnostics grouped by owning file, ordered by path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerTable {
    #[serde(default)]
    files: BTreeMap<String, Vec<Diagnostic>>,
}

impl MarkerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, diagnostic: Diagnostic) {
        self.files
            .entry(diagnostic.path.clone())
            .or_default()
            .push(diagnostic);
    }

    /// Remove every diagnostic covered by `scope`, returning how many were dropped.
    pub fn clear(&mut self, path: &str, scope: ClearScope) -> usize {
        match scope {
            ClearScope::File => self.files.remove(path).map_or(0, |d| d.len()),
            ClearScope::Descendants => {
                let mut removed = 0;
                self.files.retain(|file, diagnostics| {
                    if scope.covers(path, file) {
                        removed += diagnostics.len();
                        false
                    } else {
                        true
                    }
                });
                removed
            }
        }
    }

    pub fn diagnostics(&self, path: &str) -> Vec<Diagnostic> {
        self.files.get(path).cloned().unwrap_or_default()
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files.values().flatten()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn len(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

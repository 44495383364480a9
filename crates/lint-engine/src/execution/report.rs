use event_bus::{BuildMode, BuildSummary};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Completed,
    Cancelled,
    /// Another build of the same project was already running
    Skipped,
    /// The build could not start, e.g. the resource tree was unavailable
    Failed,
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStatus::Completed => write!(f, "completed"),
            BuildStatus::Cancelled => write!(f, "cancelled"),
            BuildStatus::Skipped => write!(f, "skipped"),
            BuildStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub message: String,
}

/// Outcome of one build request
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub project: String,
    pub mode: BuildMode,
    pub status: BuildStatus,
    pub summary: BuildSummary,
    pub failures: Vec<FileFailure>,
    pub duration_seconds: f64,
}

impl BuildReport {
    pub fn new(project: impl Into<String>, mode: BuildMode) -> Self {
        Self {
            project: project.into(),
            mode,
            status: BuildStatus::Completed,
            summary: BuildSummary::default(),
            failures: Vec::new(),
            duration_seconds: 0.0,
        }
    }

    pub fn skipped(project: impl Into<String>, mode: BuildMode) -> Self {
        Self {
            status: BuildStatus::Skipped,
            ..Self::new(project, mode)
        }
    }

    pub fn record_failure(&mut self, path: &str, error: &dyn std::error::Error) {
        self.summary.files_failed += 1;
        self.failures.push(FileFailure {
            path: path.to_string(),
            message: error.to_string(),
        });
    }

    pub fn finish(&mut self, duration: Duration) {
        self.duration_seconds = duration.as_secs_f64();
    }

    pub fn has_failures(&self) -> bool {
        self.status == BuildStatus::Failed || !self.failures.is_empty()
    }

    pub fn log_summary(&self) {
        tracing::info!(
            "{} build of {} {} in {:.2}s: {} linted, {} cleared, {} excluded, {} failed, {} diagnostic(s)",
            self.mode,
            self.project,
            self.status,
            self.duration_seconds,
            self.summary.files_linted,
            self.summary.files_cleared,
            self.summary.files_excluded,
            self.summary.files_failed,
            self.summary.diagnostics
        );
        for failure in &self.failures {
            tracing::info!("  failed: {} ({})", failure.path, failure.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AnalyzerError;

    #[test]
    fn test_record_failure_counts() {
        let mut report = BuildReport::new("web", BuildMode::Full);
        assert!(!report.has_failures());

        report.record_failure("src/b.js", &AnalyzerError::message("boom"));

        assert!(report.has_failures());
        assert_eq!(report.summary.files_failed, 1);
        assert_eq!(report.failures[0].path, "src/b.js");
        assert_eq!(report.failures[0].message, "boom");
    }

    #[test]
    fn test_report_serialization() {
        let mut report = BuildReport::skipped("web", BuildMode::Incremental);
        report.finish(Duration::from_millis(1500));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["mode"], "incremental");
        assert_eq!(json["duration_seconds"], 1.5);
    }
}

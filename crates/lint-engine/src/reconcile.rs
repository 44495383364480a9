use crate::analysis::AnalyzerCache;
use crate::errors::{AnalysisFailure, MarkerStoreFailure, ReconcileFailure};
use crate::project::file::FileRef;
use crate::project::io::read_source;
use crate::project::source::ResourceProvider;
use marker_store::{ClearScope, Diagnostic, MarkerStore};
use tracing::{debug, warn};

/// Brings the diagnostics of single files in line with the analyzer.
pub struct DiagnosticReconciler<'a> {
    store: &'a dyn MarkerStore,
    cache: &'a AnalyzerCache,
    provider: &'a dyn ResourceProvider,
    max_file_size: usize,
}

impl<'a> DiagnosticReconciler<'a> {
    pub fn new(
        store: &'a dyn MarkerStore,
        cache: &'a AnalyzerCache,
        provider: &'a dyn ResourceProvider,
        max_file_size: usize,
    ) -> Self {
        Self {
            store,
            cache,
            provider,
            max_file_size,
        }
    }

    /// Replace the diagnostics of `file` with the analyzer's current issues.
    ///
    /// The old diagnostics are cleared first, so a failure after that point leaves the
    /// file without diagnostics rather than with stale ones. Returns the number of
    /// diagnostics recorded.
    pub fn reconcile(&self, file: &FileRef) -> Result<usize, ReconcileFailure> {
        self.clear(file)?;

        let handle = self.cache.get().inspect_err(|e| {
            warn!("Failed to lint {}: {e}", file.path());
        })?;

        let content = read_source(self.provider, file, self.max_file_size).inspect_err(|e| {
            warn!("Failed to lint {}: {e}", file.path());
        })?;

        let issues = handle.analyze(file.path(), &content).map_err(|source| {
            let failure = AnalysisFailure::Analyzer {
                path: file.path().to_string(),
                source,
            };
            warn!("Failed to lint {}: {failure}", file.path());
            failure
        })?;

        for issue in &issues {
            self.store
                .create_diagnostic(Diagnostic::warning(
                    file.path(),
                    issue.line,
                    issue.message.clone(),
                ))
                .map_err(|source| self.store_failure(file.path(), source))?;
        }

        debug!("{}: {} diagnostic(s)", file.path(), issues.len());
        Ok(issues.len())
    }

    /// Drop every diagnostic of `file` without analyzing it.
    pub fn clear(&self, file: &FileRef) -> Result<usize, MarkerStoreFailure> {
        self.store
            .clear_diagnostics(file.path(), ClearScope::File)
            .map_err(|source| self.store_failure(file.path(), source))
    }

    /// Drop the diagnostics of every file below `path`.
    pub fn clear_folder(&self, path: &str) -> Result<usize, MarkerStoreFailure> {
        self.store
            .clear_diagnostics(path, ClearScope::Descendants)
            .map_err(|source| self.store_failure(path, source))
    }

    fn store_failure(&self, path: &str, source: marker_store::MarkerStoreError) -> MarkerStoreFailure {
        let failure = MarkerStoreFailure {
            path: path.to_string(),
            source,
        };
        warn!("{failure}");
        failure
    }
}

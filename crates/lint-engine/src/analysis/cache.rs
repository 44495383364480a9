use crate::analysis::{Analyzer, AnalyzerFactory, Issue, OptionOutcome};
use crate::configuration::{ConfigurationContext, ConfigurationSnapshot};
use crate::errors::{AnalysisFailure, AnalyzerError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// A configured analyzer together with the snapshot it was configured from.
pub struct AnalyzerHandle {
    analyzer: Box<dyn Analyzer>,
    snapshot: Arc<ConfigurationSnapshot>,
    ignored_options: Vec<String>,
}

impl AnalyzerHandle {
    pub fn analyze(&self, path: &str, content: &str) -> Result<Vec<Issue>, AnalyzerError> {
        self.analyzer.analyze(path, content)
    }

    pub fn snapshot(&self) -> &Arc<ConfigurationSnapshot> {
        &self.snapshot
    }

    /// Generation of the snapshot this handle was built from
    pub fn generation(&self) -> u64 {
        self.snapshot.generation()
    }

    /// Options the analyzer did not recognize or refused
    pub fn ignored_options(&self) -> &[String] {
        &self.ignored_options
    }
}

impl std::fmt::Debug for AnalyzerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerHandle")
            .field("generation", &self.generation())
            .field("ignored_options", &self.ignored_options)
            .finish()
    }
}

/// Lazily builds one analyzer per configuration snapshot.
///
/// The memoized handle is reused until the context installs a newer snapshot; the
/// next `get` then builds a replacement. A handle configured from a superseded
/// snapshot is never handed out again.
pub struct AnalyzerCache {
    context: ConfigurationContext,
    factory: Arc<dyn AnalyzerFactory>,
    memo: Mutex<Option<Arc<AnalyzerHandle>>>,
    builds: AtomicU64,
}

impl AnalyzerCache {
    pub fn new(context: ConfigurationContext, factory: Arc<dyn AnalyzerFactory>) -> Self {
        Self {
            context,
            factory,
            memo: Mutex::new(None),
            builds: AtomicU64::new(0),
        }
    }

    pub fn get(&self) -> Result<Arc<AnalyzerHandle>, AnalysisFailure> {
        let snapshot = self.context.snapshot();
        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(handle) = memo.as_ref()
            && handle.generation() == snapshot.generation()
        {
            return Ok(Arc::clone(handle));
        }

        // Drop the stale handle before building, so at most one is alive.
        *memo = None;
        let handle = Arc::new(self.build(snapshot)?);
        *memo = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Drop the memoized handle; the next `get` rebuilds.
    pub fn invalidate(&self) {
        *self.memo.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Number of analyzers built so far
    pub fn build_count(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }

    pub fn context(&self) -> &ConfigurationContext {
        &self.context
    }

    fn build(&self, snapshot: Arc<ConfigurationSnapshot>) -> Result<AnalyzerHandle, AnalysisFailure> {
        let mut analyzer = self
            .factory
            .create()
            .map_err(AnalysisFailure::AnalyzerUnavailable)?;

        analyzer.reset_options();

        let mut ignored_options = Vec::new();
        for (name, value) in snapshot.iter() {
            match analyzer.set_option(name, value) {
                OptionOutcome::Applied => {}
                OptionOutcome::Unrecognized => {
                    debug!("Analyzer does not recognize option '{name}', ignoring it");
                    ignored_options.push(name.to_string());
                }
                OptionOutcome::Rejected(reason) => {
                    warn!("Analyzer rejected option '{name}' = {value}: {reason}");
                    ignored_options.push(name.to_string());
                }
            }
        }

        self.builds.fetch_add(1, Ordering::Relaxed);
        info!(
            "Configured analyzer from snapshot {} ({} option(s), {} ignored)",
            snapshot.generation(),
            snapshot.len(),
            ignored_options.len()
        );

        Ok(AnalyzerHandle {
            analyzer,
            snapshot,
            ignored_options,
        })
    }
}

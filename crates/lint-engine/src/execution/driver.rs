use crate::changes::{
    CandidateSelector, ChangeClassifier, Classification, DeltaTraversal, FullTraversal,
};
use crate::execution::report::{BuildReport, BuildStatus, FileFailure};
use crate::execution::session::LintSession;
use crate::project::file::FileRef;
use crate::project::source::ResourceProvider;
use crate::project::tree::ResourceDelta;
use crate::reconcile::DiagnosticReconciler;
use chrono::Utc;
use event_bus::{
    BuildCancelled, BuildCompleted, BuildEvent, BuildMode, BuildStarted, FileLintStarted,
    LintEvent,
};
use marker_store::{ClearScope, MarkerStore, StoreOperation};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Runs build passes for one project.
///
/// A driver is `Idle` or `Running`; a request that arrives while a pass is running
/// returns a `Skipped` report without touching anything. Every pass runs inside one
/// marker store operation, so readers see all of its marker churn or none of it.
pub struct BuildDriver {
    session: LintSession,
    provider: Arc<dyn ResourceProvider>,
    store: Arc<dyn MarkerStore>,
    running: AtomicBool,
}

struct RunningGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl BuildDriver {
    pub fn new(
        session: LintSession,
        provider: Arc<dyn ResourceProvider>,
        store: Arc<dyn MarkerStore>,
    ) -> Self {
        Self {
            session,
            provider,
            store,
            running: AtomicBool::new(false),
        }
    }

    pub fn project_name(&self) -> &str {
        self.provider.project_name()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn store(&self) -> &Arc<dyn MarkerStore> {
        &self.store
    }

    /// Lint every source file of the project.
    pub fn run_full(&self, cancellation_token: Option<&CancellationToken>) -> BuildReport {
        let Some(_running) = RunningGuard::acquire(&self.running) else {
            return self.skipped(BuildMode::Full);
        };
        self.full_pass(cancellation_token)
    }

    /// Lint only what `delta` touched; without a delta this is a full build.
    pub fn run_incremental(
        &self,
        delta: Option<&ResourceDelta>,
        cancellation_token: Option<&CancellationToken>,
    ) -> BuildReport {
        let Some(_running) = RunningGuard::acquire(&self.running) else {
            return self.skipped(BuildMode::Incremental);
        };

        match delta {
            Some(delta) => {
                self.execute(&DeltaTraversal::new(delta), cancellation_token, Instant::now())
            }
            None => {
                info!(
                    "No resource delta for {}, falling back to a full build",
                    self.project_name()
                );
                self.full_pass(cancellation_token)
            }
        }
    }

    /// Remove every diagnostic of the project.
    pub fn clean(&self) -> BuildReport {
        let Some(_running) = RunningGuard::acquire(&self.running) else {
            return self.skipped(BuildMode::Clean);
        };

        let start_time = Instant::now();
        let project = self.project_name().to_string();
        let mut report = BuildReport::new(project.clone(), BuildMode::Clean);
        self.send_started(BuildMode::Clean);

        let files: BTreeSet<String> = match self.store.all_diagnostics() {
            Ok(diagnostics) => diagnostics.into_iter().map(|d| d.path).collect(),
            Err(e) => {
                warn!("Failed to list diagnostics of {project}: {e}");
                BTreeSet::new()
            }
        };

        {
            let _operation = self.begin_operation();
            match self.store.clear_diagnostics("", ClearScope::Descendants) {
                Ok(removed) => {
                    report.summary.files_cleared = files.len();
                    info!("Removed {removed} diagnostic(s) from {project}");
                }
                Err(e) => {
                    error!("Failed to clean diagnostics of {project}: {e}");
                    report.status = BuildStatus::Failed;
                    report.summary.files_failed += 1;
                    report.failures.push(FileFailure {
                        path: String::new(),
                        message: e.to_string(),
                    });
                }
            }
        }

        report.finish(start_time.elapsed());
        self.send_finished(&report);
        report.log_summary();
        report
    }

    fn full_pass(&self, cancellation_token: Option<&CancellationToken>) -> BuildReport {
        let start_time = Instant::now();
        match self.provider.resource_tree() {
            Ok(tree) => self.execute(&FullTraversal::new(&tree), cancellation_token, start_time),
            Err(e) => {
                error!("Failed to list resources of {}: {e}", self.project_name());
                let mut report = BuildReport::new(self.project_name(), BuildMode::Full);
                report.status = BuildStatus::Failed;
                report.failures.push(FileFailure {
                    path: String::new(),
                    message: e.to_string(),
                });
                report.finish(start_time.elapsed());
                report
            }
        }
    }

    fn execute(
        &self,
        classifier: &dyn ChangeClassifier,
        cancellation_token: Option<&CancellationToken>,
        start_time: Instant,
    ) -> BuildReport {
        let mode = classifier.mode();
        let project = self.project_name().to_string();
        let mut report = BuildReport::new(project.clone(), mode);

        if is_cancelled(cancellation_token) {
            info!("{mode} build of {project} cancelled before starting");
            report.status = BuildStatus::Cancelled;
            report.finish(start_time.elapsed());
            return report;
        }

        self.send_started(mode);

        let config = self.session.config();
        let rules = self.session.context().exclusion_rules();
        let selector = CandidateSelector::new(&config.source_extensions, &rules);
        let classification = classifier.classify(&selector);
        info!(
            "{mode} build of {project}: {} candidate(s), {} excluded",
            classification.candidates.len(),
            classification.excluded.len()
        );

        let reconciler = DiagnosticReconciler::new(
            self.store.as_ref(),
            self.session.cache(),
            self.provider.as_ref(),
            config.max_file_size,
        );

        let vanished = match mode {
            BuildMode::Full => self.vanished_paths(&classification),
            _ => Vec::new(),
        };

        {
            let _operation = self.begin_operation();

            // Files recorded earlier that are no longer part of the project.
            for path in &vanished {
                match reconciler.clear(&FileRef::new(path)) {
                    Ok(_) => report.summary.files_cleared += 1,
                    Err(e) => report.record_failure(path, &e),
                }
            }

            for folder in &classification.removed_folders {
                match reconciler.clear_folder(folder) {
                    Ok(_) => report.summary.files_cleared += 1,
                    Err(e) => report.record_failure(folder, &e),
                }
            }

            // Rules may have been added after these files were last linted.
            for file in &classification.excluded {
                match reconciler.clear(file) {
                    Ok(_) => report.summary.files_excluded += 1,
                    Err(e) => report.record_failure(file.path(), &e),
                }
            }

            let total = classification.candidates.len();
            for (index, event) in classification.candidates.iter().enumerate() {
                if is_cancelled(cancellation_token) {
                    info!("{mode} build of {project} cancelled after {index} of {total} file(s)");
                    report.status = BuildStatus::Cancelled;
                    break;
                }

                if event.is_removal() {
                    match reconciler.clear(&event.file) {
                        Ok(_) => report.summary.files_cleared += 1,
                        Err(e) => report.record_failure(event.path(), &e),
                    }
                    continue;
                }

                self.session
                    .event_bus()
                    .send(&LintEvent::Build(BuildEvent::FileLintStarted(
                        FileLintStarted {
                            project: project.clone(),
                            path: event.path().to_string(),
                            position: index + 1,
                            total,
                        },
                    )));

                match reconciler.reconcile(&event.file) {
                    Ok(count) => {
                        report.summary.files_linted += 1;
                        report.summary.diagnostics += count;
                    }
                    Err(e) => report.record_failure(event.path(), &e),
                }
            }
        }

        report.finish(start_time.elapsed());
        self.send_finished(&report);
        report.log_summary();
        report
    }

    /// Paths holding diagnostics that a full traversal no longer reaches.
    fn vanished_paths(&self, classification: &Classification) -> Vec<String> {
        let reached: BTreeSet<&str> = classification
            .candidates
            .iter()
            .map(|event| event.path())
            .chain(classification.excluded.iter().map(FileRef::path))
            .collect();

        match self.store.all_diagnostics() {
            Ok(diagnostics) => diagnostics
                .into_iter()
                .map(|d| d.path)
                .filter(|path| !reached.contains(path.as_str()))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            Err(e) => {
                warn!(
                    "Failed to list diagnostics of {}, keeping those of vanished files: {e}",
                    self.project_name()
                );
                Vec::new()
            }
        }
    }

    fn begin_operation(&self) -> Option<StoreOperation<'_>> {
        match StoreOperation::begin(self.store.as_ref()) {
            Ok(operation) => Some(operation),
            Err(e) => {
                warn!(
                    "Failed to begin marker store operation for {}, publishing per write: {e}",
                    self.project_name()
                );
                None
            }
        }
    }

    fn skipped(&self, mode: BuildMode) -> BuildReport {
        info!(
            "Skipping {mode} build of {}: a build is already running",
            self.project_name()
        );
        BuildReport::skipped(self.project_name(), mode)
    }

    fn send_started(&self, mode: BuildMode) {
        self.session
            .event_bus()
            .send(&LintEvent::Build(BuildEvent::Started(BuildStarted {
                project: self.project_name().to_string(),
                mode,
                started_at: Utc::now(),
            })));
    }

    fn send_finished(&self, report: &BuildReport) {
        let event = match report.status {
            BuildStatus::Cancelled => BuildEvent::Cancelled(BuildCancelled {
                project: report.project.clone(),
                mode: report.mode,
                summary: report.summary.clone(),
                cancelled_at: Utc::now(),
            }),
            _ => BuildEvent::Completed(BuildCompleted {
                project: report.project.clone(),
                mode: report.mode,
                summary: report.summary.clone(),
                completed_at: Utc::now(),
            }),
        };
        self.session.event_bus().send(&LintEvent::Build(event));
    }
}

fn is_cancelled(cancellation_token: Option<&CancellationToken>) -> bool {
    cancellation_token.is_some_and(|token| token.is_cancelled())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ChangeKind;
    use crate::configuration::{ConfigurationSource, PreferenceStore};
    use crate::execution::config::EngineConfig;
    use crate::project::file::FileRef;
    use crate::testing::{MemoryResourceProvider, ScriptedFactory};
    use event_bus::EventBus;
    use marker_store::{Diagnostic, InMemoryMarkerStore};

    const NS: &str = "jslint4java";

    struct Fixture {
        preferences: Arc<PreferenceStore>,
        provider: Arc<MemoryResourceProvider>,
        store: Arc<InMemoryMarkerStore>,
        event_bus: Arc<EventBus>,
        factory: ScriptedFactory,
    }

    impl Fixture {
        fn new() -> Self {
            let provider = Arc::new(MemoryResourceProvider::new("web"));
            provider.write("src/a.js", "if (a == b) {}\n");
            provider.write("src/b.js", "var b = 1;\n");
            provider.write("README.md", "a == b");
            Self {
                preferences: Arc::new(PreferenceStore::with_jslint_defaults(NS)),
                provider,
                store: Arc::new(InMemoryMarkerStore::new()),
                event_bus: Arc::new(EventBus::new()),
                factory: ScriptedFactory::new(),
            }
        }

        fn driver(&self) -> BuildDriver {
            let session = LintSession::new(
                self.preferences.clone() as Arc<dyn ConfigurationSource>,
                Arc::new(self.factory.clone()),
                Arc::clone(&self.event_bus),
                EngineConfig::default(),
            );
            BuildDriver::new(
                session,
                self.provider.clone() as Arc<dyn ResourceProvider>,
                self.store.clone() as Arc<dyn MarkerStore>,
            )
        }
    }

    #[test]
    fn test_full_build_lints_source_files() {
        let fixture = Fixture::new();
        let driver = fixture.driver();

        let report = driver.run_full(None);

        assert_eq!(report.status, BuildStatus::Completed);
        assert_eq!(report.summary.files_linted, 2);
        assert_eq!(report.summary.diagnostics, 1);
        assert_eq!(fixture.store.diagnostics("src/a.js").unwrap().len(), 1);
        assert!(fixture.store.diagnostics("README.md").unwrap().is_empty());
        assert!(!driver.is_running());
    }

    #[test]
    fn test_incremental_build_touches_only_the_delta() {
        let fixture = Fixture::new();
        let driver = fixture.driver();
        driver.run_full(None);
        let probe = fixture.factory.probe();
        probe.clear();

        fixture.provider.write("src/b.js", "if (b != c) {}\n");
        let delta = ResourceDelta::root(vec![ResourceDelta::file(
            FileRef::new("src/b.js"),
            ChangeKind::Changed,
        )]);
        let report = driver.run_incremental(Some(&delta), None);

        assert_eq!(report.mode, BuildMode::Incremental);
        assert_eq!(probe.calls(), vec!["src/b.js".to_string()]);
        assert_eq!(fixture.store.diagnostics("src/a.js").unwrap().len(), 1);
        assert_eq!(fixture.store.diagnostics("src/b.js").unwrap().len(), 1);
    }

    #[test]
    fn test_incremental_without_delta_runs_full_build() {
        let fixture = Fixture::new();
        let driver = fixture.driver();

        let report = driver.run_incremental(None, None);

        assert_eq!(report.mode, BuildMode::Full);
        assert_eq!(report.summary.files_linted, 2);
    }

    #[test]
    fn test_removed_file_is_cleared_without_analysis() {
        let fixture = Fixture::new();
        let driver = fixture.driver();
        driver.run_full(None);
        let probe = fixture.factory.probe();
        probe.clear();

        fixture.provider.remove("src/a.js");
        let delta = ResourceDelta::root(vec![ResourceDelta::file(
            FileRef::new("src/a.js"),
            ChangeKind::Removed,
        )]);
        let report = driver.run_incremental(Some(&delta), None);

        assert_eq!(report.summary.files_cleared, 1);
        assert!(probe.calls().is_empty());
        assert!(fixture.store.diagnostics("src/a.js").unwrap().is_empty());
    }

    #[test]
    fn test_removed_folder_clears_descendants() {
        let fixture = Fixture::new();
        let driver = fixture.driver();
        driver.run_full(None);

        let delta = ResourceDelta::root(vec![ResourceDelta::folder(
            "src",
            ChangeKind::Removed,
            vec![],
        )]);
        driver.run_incremental(Some(&delta), None);

        assert!(fixture.store.all_diagnostics().unwrap().is_empty());
    }

    #[test]
    fn test_cancelled_before_start_touches_nothing() {
        let fixture = Fixture::new();
        let driver = fixture.driver();
        let token = CancellationToken::new();
        token.cancel();

        let report = driver.run_full(Some(&token));

        assert_eq!(report.status, BuildStatus::Cancelled);
        assert!(fixture.factory.probe().calls().is_empty());
    }

    #[test]
    fn test_build_events_are_emitted() {
        let fixture = Fixture::new();
        let mut events = fixture.event_bus.subscribe();
        let driver = fixture.driver();

        driver.run_full(None);

        let mut received = Vec::new();
        while let Ok(LintEvent::Build(event)) = events.try_recv() {
            received.push(event);
        }
        assert!(matches!(received.first(), Some(BuildEvent::Started(_))));
        let progress: Vec<(String, usize, usize)> = received
            .iter()
            .filter_map(|event| match event {
                BuildEvent::FileLintStarted(e) => Some((e.path.clone(), e.position, e.total)),
                _ => None,
            })
            .collect();
        assert_eq!(
            progress,
            vec![("src/a.js".to_string(), 1, 2), ("src/b.js".to_string(), 2, 2)]
        );
        match received.last() {
            Some(BuildEvent::Completed(completed)) => {
                assert_eq!(completed.summary.files_linted, 2);
            }
            other => panic!("unexpected final event: {other:?}"),
        }
    }

    #[test]
    fn test_unavailable_project_fails_the_build() {
        let fixture = Fixture::new();
        fixture.provider.set_unavailable(true);
        let driver = fixture.driver();

        let report = driver.run_full(None);

        assert_eq!(report.status, BuildStatus::Failed);
        assert!(report.has_failures());
    }

    #[test]
    fn test_clean_removes_every_diagnostic() {
        let fixture = Fixture::new();
        fixture
            .store
            .create_diagnostic(Diagnostic::warning("lib/x.js", 1, "old"))
            .unwrap();
        let driver = fixture.driver();
        driver.run_full(None);

        let report = driver.clean();

        assert_eq!(report.mode, BuildMode::Clean);
        assert_eq!(report.summary.files_cleared, 2);
        assert!(fixture.store.all_diagnostics().unwrap().is_empty());
    }
}

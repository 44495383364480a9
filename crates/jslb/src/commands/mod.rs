pub mod build;
pub mod clean;
pub mod list;
pub mod update;

use crate::cli::GlobalArgs;
use crate::settings::Settings;
use anyhow::{Context, Result};
use event_bus::EventBus;
use lint_engine::analysis::{Analyzer, AnalyzerFactory, ProcessAnalyzer};
use lint_engine::configuration::ConfigurationSource;
use lint_engine::project::FsResourceProvider;
use lint_engine::{AnalyzerError, BuildDriver, BuildReport, BuildStatus, LintSession};
use marker_store::{DataDirectory, JsonMarkerStore};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

const FRAMEWORK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A project directory together with its settings and marker location.
pub struct Project {
    pub root: PathBuf,
    pub settings: Settings,
    pub data_directory: DataDirectory,
}

impl Project {
    pub fn open(project_path: &Path, global: &GlobalArgs) -> Result<Self> {
        let root = dunce::canonicalize(project_path)
            .with_context(|| format!("Project directory {} not found", project_path.display()))?;
        if !root.is_dir() {
            anyhow::bail!("{} is not a directory", root.display());
        }

        let settings = Settings::load(&root, global.config.as_deref())?;
        let data_directory = data_directory(global)?;

        Ok(Self {
            root,
            settings,
            data_directory,
        })
    }

    pub fn markers_path(&self) -> PathBuf {
        self.data_directory.project_markers_path(&self.root)
    }

    pub fn marker_store(&self) -> Result<JsonMarkerStore> {
        self.data_directory.ensure_project_directory(&self.root)?;
        Ok(JsonMarkerStore::new(
            self.markers_path(),
            FRAMEWORK_VERSION.to_string(),
        )?)
    }

    pub fn provider(&self) -> Arc<FsResourceProvider> {
        Arc::new(FsResourceProvider::new(self.root.clone()))
    }

    /// Wire a build driver for this project.
    ///
    /// Without an `[analyzer]` section every lint attempt fails; `clean` does not
    /// need one.
    pub fn driver(
        &self,
        provider: Arc<FsResourceProvider>,
        event_bus: Arc<EventBus>,
    ) -> Result<BuildDriver> {
        let config = self.settings.engine_config();
        let source: Arc<dyn ConfigurationSource> =
            Arc::new(self.settings.preference_store(&config.namespace)?);
        let session = LintSession::new(source, self.analyzer_factory(), event_bus, config);
        Ok(BuildDriver::new(
            session,
            provider,
            Arc::new(self.marker_store()?),
        ))
    }

    pub fn require_analyzer(&self) -> Result<()> {
        if self.settings.analyzer.is_none() {
            anyhow::bail!(
                "No analyzer configured for {}; add an [analyzer] section to .jslint.toml",
                self.root.display()
            );
        }
        Ok(())
    }

    fn analyzer_factory(&self) -> Arc<dyn AnalyzerFactory> {
        let Some(config) = self.settings.analyzer_config() else {
            return Arc::new(|| -> Result<Box<dyn Analyzer>, AnalyzerError> {
                Err(AnalyzerError::message("no analyzer configured"))
            });
        };

        let config = Arc::new(config);
        Arc::new(move || -> Result<Box<dyn Analyzer>, AnalyzerError> {
            Ok(Box::new(ProcessAnalyzer::new(Arc::clone(&config))))
        })
    }
}

/// `--data-dir`, or `~/.jslint-builder` when none was given.
pub fn data_directory(global: &GlobalArgs) -> Result<DataDirectory> {
    let data_directory = match &global.data_dir {
        Some(dir) => DataDirectory::new(dir.clone())?,
        None => DataDirectory::new_system_default()?,
    };
    Ok(data_directory)
}

/// Cancel the returned token on Ctrl-C so the build stops between files.
pub fn cancel_on_interrupt() -> Result<CancellationToken> {
    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        eprintln!("Interrupted, stopping after the current file...");
        handler_token.cancel();
    })?;
    Ok(token)
}

/// Run a blocking build on the blocking pool while a task prints its progress.
pub async fn run_with_progress<F>(event_bus: Arc<EventBus>, build: F) -> Result<BuildReport>
where
    F: FnOnce() -> BuildReport + Send + 'static,
{
    let printer = crate::progress::spawn_printer(event_bus.subscribe());
    // The printer finishes once every sender is gone.
    drop(event_bus);

    let report = tokio::task::spawn_blocking(build).await?;
    if let Err(e) = printer.await {
        warn!("Progress printer stopped unexpectedly: {e}");
    }
    Ok(report)
}

/// Exit non-zero for builds that did not do their job.
pub fn finish(report: &BuildReport, strict: bool) {
    match report.status {
        BuildStatus::Completed => {
            if strict && report.has_failures() {
                error!(
                    "{} file(s) failed to lint in {}",
                    report.failures.len(),
                    report.project
                );
                process::exit(1);
            }
        }
        BuildStatus::Cancelled => process::exit(130),
        BuildStatus::Skipped => {
            error!("Another build of {} is already running", report.project);
            process::exit(1);
        }
        BuildStatus::Failed => {
            error!("Build of {} failed", report.project);
            process::exit(1);
        }
    }
}

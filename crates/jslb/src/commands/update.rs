use crate::cli::GlobalArgs;
use crate::commands::{Project, cancel_on_interrupt, finish, run_with_progress};
use anyhow::{Context, Result};
use event_bus::EventBus;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Incremental build over the paths a watcher or editor reported as touched.
///
/// `changed` paths are relative to the current directory. Paths that no longer
/// exist are treated as removed.
pub async fn run(project_path: &Path, changed: &[PathBuf], global: &GlobalArgs) -> Result<()> {
    let project = Project::open(project_path, global)?;
    project.require_analyzer()?;

    let changed = changed
        .iter()
        .map(|path| absolute_path(path))
        .collect::<Result<Vec<_>>>()?;

    let provider = project.provider();
    let delta = provider.delta_from_changed_paths(&changed);
    debug!("Resource delta for {}: {delta:?}", project.root.display());

    let event_bus = Arc::new(EventBus::new());
    let driver = project.driver(provider, Arc::clone(&event_bus))?;
    let cancellation_token = cancel_on_interrupt()?;

    let report = run_with_progress(event_bus, move || {
        driver.run_incremental(Some(&delta), Some(&cancellation_token))
    })
    .await?;

    finish(&report, global.strict);
    Ok(())
}

// Removed files cannot be canonicalized; resolve their closest existing ancestor
// instead so they still fall under the canonical project root.
fn absolute_path(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("Invalid path {}", path.display()))?;
    if let Ok(canonical) = dunce::canonicalize(&absolute) {
        return Ok(canonical);
    }

    let mut missing = Vec::new();
    let mut current = absolute.as_path();
    while let (Some(parent), Some(name)) = (current.parent(), current.file_name()) {
        missing.push(name);
        if let Ok(canonical) = dunce::canonicalize(parent) {
            return Ok(missing.iter().rev().fold(canonical, |acc, name| acc.join(name)));
        }
        current = parent;
    }
    Ok(absolute)
}

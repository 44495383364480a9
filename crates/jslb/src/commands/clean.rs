use crate::cli::GlobalArgs;
use crate::commands::{Project, finish};
use anyhow::Result;
use event_bus::EventBus;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub fn run(project_path: &Path, global: &GlobalArgs) -> Result<()> {
    let project = Project::open(project_path, global)?;
    let driver = project.driver(project.provider(), Arc::new(EventBus::new()))?;

    let report = driver.clean();
    info!(
        "Removed diagnostics of {} file(s) from {}",
        report.summary.files_cleared, report.project
    );

    finish(&report, global.strict);
    Ok(())
}

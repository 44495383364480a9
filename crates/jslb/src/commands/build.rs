use crate::cli::GlobalArgs;
use crate::commands::{Project, cancel_on_interrupt, finish, run_with_progress};
use anyhow::Result;
use event_bus::EventBus;
use std::path::Path;
use std::sync::Arc;

pub async fn run(project_path: &Path, global: &GlobalArgs) -> Result<()> {
    let project = Project::open(project_path, global)?;
    project.require_analyzer()?;

    let event_bus = Arc::new(EventBus::new());
    let driver = project.driver(project.provider(), Arc::clone(&event_bus))?;
    let cancellation_token = cancel_on_interrupt()?;

    let report = run_with_progress(event_bus, move || {
        driver.run_full(Some(&cancellation_token))
    })
    .await?;

    finish(&report, global.strict);
    Ok(())
}

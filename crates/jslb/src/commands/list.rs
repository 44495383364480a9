use crate::cli::GlobalArgs;
use crate::commands::Project;
use anyhow::Result;
use marker_store::MarkerStore;
use std::path::Path;
use tracing::info;

pub fn run(project_path: &Path, json: bool, global: &GlobalArgs) -> Result<()> {
    let project = Project::open(project_path, global)?;

    let mut diagnostics = if project.markers_path().exists() {
        project.marker_store()?.all_diagnostics()?
    } else {
        Vec::new()
    };
    diagnostics.sort();

    if json {
        // We're printing to stdout, so we don't need to use tracing
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
        return Ok(());
    }

    for diagnostic in &diagnostics {
        println!("{diagnostic}");
    }
    info!(
        "{} diagnostic(s) recorded for {}",
        diagnostics.len(),
        project.root.display()
    );
    Ok(())
}

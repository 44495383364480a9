use event_bus::{BuildEvent, ConfigurationEvent, LintEvent};
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tokio::task::JoinHandle;
use tracing::debug;

/// Print build progress until the event bus closes.
pub fn spawn_printer(mut rx: Receiver<LintEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(line) = render(&event) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Progress printer skipped {skipped} event(s)");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn render(event: &LintEvent) -> Option<String> {
    match event {
        LintEvent::Build(BuildEvent::Started(started)) => {
            Some(format!("Starting {} build of {}", started.mode, started.project))
        }
        LintEvent::Build(BuildEvent::FileLintStarted(file)) => {
            Some(format!("[{}/{}] {}", file.position, file.total, file.path))
        }
        LintEvent::Build(BuildEvent::Cancelled(cancelled)) => Some(format!(
            "Build of {} cancelled after {} file(s)",
            cancelled.project, cancelled.summary.files_linted
        )),
        LintEvent::Configuration(ConfigurationEvent::ExclusionRejected(rejected)) => Some(
            format!("Ignoring invalid exclusion '{}': {}", rejected.spec, rejected.error),
        ),
        // The driver logs the completed summary itself.
        LintEvent::Build(BuildEvent::Completed(_))
        | LintEvent::Configuration(ConfigurationEvent::Changed(_)) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use event_bus::{BuildMode, BuildSummary, EventBus, FileLintStarted};

    #[test]
    fn test_render_file_progress() {
        let event = LintEvent::Build(BuildEvent::FileLintStarted(FileLintStarted {
            project: "web".to_string(),
            path: "src/app.js".to_string(),
            position: 2,
            total: 5,
        }));

        assert_eq!(render(&event).as_deref(), Some("[2/5] src/app.js"));
    }

    #[test]
    fn test_completed_builds_are_not_rendered() {
        let event = LintEvent::Build(BuildEvent::Completed(event_bus::BuildCompleted {
            project: "web".to_string(),
            mode: BuildMode::Full,
            summary: BuildSummary::default(),
            completed_at: Utc::now(),
        }));

        assert!(render(&event).is_none());
    }

    #[test]
    fn test_render_rejected_exclusion() {
        let event = LintEvent::Configuration(ConfigurationEvent::ExclusionRejected(
            event_bus::ExclusionRejected {
                spec: "(unclosed".to_string(),
                error: "unclosed group".to_string(),
                rejected_at: Utc::now(),
            },
        ));

        assert_eq!(
            render(&event).as_deref(),
            Some("Ignoring invalid exclusion '(unclosed': unclosed group")
        );
    }

    #[tokio::test]
    async fn test_printer_stops_when_bus_is_dropped() {
        let event_bus = EventBus::new();
        let printer = spawn_printer(event_bus.subscribe());

        drop(event_bus);

        printer.await.unwrap();
    }
}

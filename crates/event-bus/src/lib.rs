//! # Lint Event Bus
//!
//! The event bus broadcasts structured information about what the lint engine is
//! doing: build passes starting and finishing, the file currently being linted, and
//! configuration changes picked up mid-session.
//!
//! ## Event Flow Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────┐    ┌─────────────────┐
//! │   Build Driver  │    │  Event Bus   │    │   Consumers     │
//! │                 │───▶│  (Broadcast) │───▶│   • CLI         │
//! │ • Build passes  │    │              │    │   • IDE glue    │
//! │ • File progress │    │              │    │   • Tests       │
//! │ • Config swaps  │    │              │    │                 │
//! └─────────────────┘    └──────────────┘    └─────────────────┘
//! ```
//!
//! ## Event-Bus vs Logging
//!
//! Logging tells developers *what the engine is doing*; the event bus lets clients
//! react to *what the engine has accomplished*, with complete payloads.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast::{self, Sender};

pub mod types;

pub use types::build_summary::{BuildMode, BuildSummary};

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum LintEvent {
    Build(BuildEvent),
    Configuration(ConfigurationEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status")]
pub enum BuildEvent {
    Started(BuildStarted),
    FileLintStarted(FileLintStarted),
    Completed(BuildCompleted),
    Cancelled(BuildCancelled),
}

#[derive(Clone, Debug, Serialize)]
pub struct BuildStarted {
    pub project: String,
    pub mode: BuildMode,
    pub started_at: DateTime<Utc>,
}

/// Emitted right before a file is reconciled
#[derive(Clone, Debug, Serialize)]
pub struct FileLintStarted {
    pub project: String,
    pub path: String,
    /// 1-based position of the file in this build's candidate list
    pub position: usize,
    pub total: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct BuildCompleted {
    pub project: String,
    pub mode: BuildMode,
    pub summary: BuildSummary,
    pub completed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BuildCancelled {
    pub project: String,
    pub mode: BuildMode,
    pub summary: BuildSummary,
    pub cancelled_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status")]
pub enum ConfigurationEvent {
    Changed(ConfigurationChanged),
    ExclusionRejected(ExclusionRejected),
}

#[derive(Clone, Debug, Serialize)]
pub struct ConfigurationChanged {
    pub namespace: String,
    pub key: String,
    pub changed_at: DateTime<Utc>,
}

/// An exclusion spec failed to compile; the previous rules stay in effect
#[derive(Clone, Debug, Serialize)]
pub struct ExclusionRejected {
    pub spec: String,
    pub error: String,
    pub rejected_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct EventBus {
    sender: Sender<LintEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self { sender }
    }

    pub fn send(&self, event: &LintEvent) {
        if self.sender.send(event.clone()).is_err() {
            // No receivers is a normal state, e.g. headless builds.
            tracing::debug!("No receivers for event bus, ignoring event: {:?}", &event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LintEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

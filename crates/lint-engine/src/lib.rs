//! # Lint Engine
//!
//! Incremental JavaScript lint engine. On every build request it works out which
//! files a change touched, skips excluded ones, lints the rest with an analyzer
//! configured from the current preferences, and replaces their diagnostics in a
//! marker store.
//!
//! ```text
//! BuildDriver ─▶ ChangeClassifier ─▶ CandidateSelector (ExclusionRules)
//!      │
//!      └──▶ DiagnosticReconciler ─▶ AnalyzerCache ─▶ Analyzer
//!                    │
//!                    └──▶ MarkerStore
//! ```

pub mod analysis;
pub mod changes;
pub mod configuration;
pub mod errors;
pub mod exclusion;
pub mod execution;
pub mod project;
pub mod reconcile;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use analysis::{Analyzer, AnalyzerCache, AnalyzerFactory, AnalyzerHandle, Issue, OptionOutcome};
pub use changes::{ChangeEvent, ChangeKind};
pub use configuration::{ConfigurationContext, ConfigurationSnapshot, OptionValue, PreferenceStore};
pub use errors::{AnalysisFailure, AnalyzerError, ConfigurationError, ReconcileFailure};
pub use exclusion::ExclusionRules;
pub use execution::{BuildDriver, BuildReport, BuildStatus, EngineConfig, LintSession};
pub use reconcile::DiagnosticReconciler;

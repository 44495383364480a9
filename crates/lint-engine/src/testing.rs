//! Test doubles for the engine's collaborators.
//!
//! Available to this crate's tests and, with the `test-utils` feature, to
//! downstream crates.

use crate::analysis::{Analyzer, AnalyzerFactory, Issue, OptionOutcome};
use crate::configuration::OptionValue;
use crate::errors::AnalyzerError;
use crate::project::file::FileRef;
use crate::project::source::ResourceProvider;
use crate::project::tree::ResourceNode;
use marker_store::{
    ClearScope, Diagnostic, InMemoryMarkerStore, MarkerStore, MarkerStoreError,
};
use std::collections::{BTreeMap, HashSet};
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Paths analyzed by every analyzer sharing the probe, in call order.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerProbe {
    calls: Arc<Mutex<Vec<String>>>,
}

impl AnalyzerProbe {
    pub fn record(&self, path: &str) {
        self.calls.lock().unwrap().push(path.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_analyzed(&self, path: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|p| p == path)
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

/// A tiny line-based analyzer with a few recognizable rules.
///
/// - `eqeqeq`: one issue per line using `==` or `!=`
/// - `plusplus`: one issue per line using `++` or `--`
/// - `maxlen`: one issue per line longer than the limit
///
/// `undef`, `white` and `predef` are accepted but have no effect; every other
/// option is unrecognized.
#[derive(Debug, Default)]
pub struct ScriptedAnalyzer {
    eqeqeq: bool,
    plusplus: bool,
    maxlen: Option<usize>,
    fail_on: HashSet<String>,
    probe: AnalyzerProbe,
}

impl ScriptedAnalyzer {
    pub const EQEQEQ_MESSAGE: &'static str = "Expected '===' and instead saw '=='.";
    pub const PLUSPLUS_MESSAGE: &'static str = "Unexpected '++'.";
    pub const MAXLEN_MESSAGE: &'static str = "Line too long.";

    const ACCEPTED: &'static [&'static str] = &["undef", "white", "predef"];
}

impl Analyzer for ScriptedAnalyzer {
    fn reset_options(&mut self) {
        self.eqeqeq = false;
        self.plusplus = false;
        self.maxlen = None;
    }

    fn set_option(&mut self, name: &str, value: &OptionValue) -> OptionOutcome {
        match (name, value) {
            ("eqeqeq", OptionValue::Boolean(on)) => self.eqeqeq = *on,
            ("plusplus", OptionValue::Boolean(on)) => self.plusplus = *on,
            ("maxlen", OptionValue::Integer(n)) => match usize::try_from(*n) {
                Ok(limit) => self.maxlen = Some(limit),
                Err(_) => return OptionOutcome::Rejected(format!("invalid line length {n}")),
            },
            (name, _) if Self::ACCEPTED.contains(&name) => {}
            _ => return OptionOutcome::Unrecognized,
        }
        OptionOutcome::Applied
    }

    fn analyze(&self, path: &str, content: &str) -> Result<Vec<Issue>, AnalyzerError> {
        self.probe.record(path);
        if self.fail_on.contains(path) {
            return Err(AnalyzerError::message(format!("scripted failure for {path}")));
        }

        let mut issues = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line_number = index as u32 + 1;
            let loose = line.replace("===", "").replace("!==", "");
            if self.eqeqeq && (loose.contains("==") || loose.contains("!=")) {
                issues.push(Issue::new(line_number, Self::EQEQEQ_MESSAGE));
            }
            if self.plusplus && (line.contains("++") || line.contains("--")) {
                issues.push(Issue::new(line_number, Self::PLUSPLUS_MESSAGE));
            }
            if let Some(limit) = self.maxlen
                && line.chars().count() > limit
            {
                issues.push(Issue::new(line_number, Self::MAXLEN_MESSAGE));
            }
        }
        Ok(issues)
    }
}

/// Builds [`ScriptedAnalyzer`]s sharing one probe and failure set.
#[derive(Debug, Default, Clone)]
pub struct ScriptedFactory {
    fail_on: HashSet<String>,
    probe: AnalyzerProbe,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analysis of `path` fails with an analyzer error
    pub fn failing_on(mut self, path: &str) -> Self {
        self.fail_on.insert(path.to_string());
        self
    }

    pub fn probe(&self) -> AnalyzerProbe {
        self.probe.clone()
    }
}

impl AnalyzerFactory for ScriptedFactory {
    fn create(&self) -> Result<Box<dyn Analyzer>, AnalyzerError> {
        Ok(Box::new(ScriptedAnalyzer {
            fail_on: self.fail_on.clone(),
            probe: self.probe.clone(),
            ..Default::default()
        }))
    }
}

pub fn scripted_factory() -> Arc<dyn AnalyzerFactory> {
    Arc::new(ScriptedFactory::new())
}

struct FailingFactory {
    message: String,
}

impl AnalyzerFactory for FailingFactory {
    fn create(&self) -> Result<Box<dyn Analyzer>, AnalyzerError> {
        Err(AnalyzerError::message(self.message.clone()))
    }
}

/// A factory that can never build an analyzer
pub fn failing_factory(message: &str) -> Arc<dyn AnalyzerFactory> {
    Arc::new(FailingFactory {
        message: message.to_string(),
    })
}

/// Project held entirely in memory; files can be edited between builds.
pub struct MemoryResourceProvider {
    name: String,
    files: RwLock<BTreeMap<String, (Vec<u8>, String)>>,
    unavailable: AtomicBool,
}

impl MemoryResourceProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            files: RwLock::new(BTreeMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn write(&self, path: &str, content: &str) {
        self.write_bytes(path, content.as_bytes().to_vec(), "UTF-8");
    }

    pub fn write_bytes(&self, path: &str, bytes: Vec<u8>, encoding: &str) {
        let file = FileRef::new(path);
        self.files
            .write()
            .unwrap()
            .insert(file.path().to_string(), (bytes, encoding.to_string()));
    }

    pub fn remove(&self, path: &str) {
        self.files.write().unwrap().remove(path);
    }

    pub fn file(&self, path: &str) -> FileRef {
        let files = self.files.read().unwrap();
        match files.get(path) {
            Some((_, encoding)) => FileRef::with_encoding(path, encoding.clone()),
            None => FileRef::new(path),
        }
    }

    /// Make `resource_tree` fail, as if the project were closed
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl ResourceProvider for MemoryResourceProvider {
    fn project_name(&self) -> &str {
        &self.name
    }

    fn resource_tree(&self) -> anyhow::Result<ResourceNode> {
        if self.unavailable.load(Ordering::SeqCst) {
            anyhow::bail!("project {} is not accessible", self.name);
        }
        let files = self.files.read().unwrap();
        Ok(ResourceNode::from_files(files.iter().map(
            |(path, (_, encoding))| FileRef::with_encoding(path, encoding.clone()),
        )))
    }

    fn open(&self, file: &FileRef) -> std::io::Result<Box<dyn Read + '_>> {
        let files = self.files.read().unwrap();
        match files.get(file.path()) {
            Some((bytes, _)) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", file.path()),
            )),
        }
    }
}

/// In-memory store that refuses diagnostic writes for chosen paths.
#[derive(Debug, Default)]
pub struct FlakyMarkerStore {
    inner: InMemoryMarkerStore,
    failing: HashSet<String>,
}

impl FlakyMarkerStore {
    pub fn failing_on(path: &str) -> Self {
        Self {
            inner: InMemoryMarkerStore::new(),
            failing: [path.to_string()].into_iter().collect(),
        }
    }
}

impl MarkerStore for FlakyMarkerStore {
    fn create_diagnostic(&self, diagnostic: Diagnostic) -> marker_store::Result<()> {
        if self.failing.contains(&diagnostic.path) {
            return Err(MarkerStoreError::Rejected {
                path: diagnostic.path,
                reason: "scripted failure".to_string(),
            });
        }
        self.inner.create_diagnostic(diagnostic)
    }

    fn clear_diagnostics(&self, path: &str, scope: ClearScope) -> marker_store::Result<usize> {
        self.inner.clear_diagnostics(path, scope)
    }

    fn diagnostics(&self, path: &str) -> marker_store::Result<Vec<Diagnostic>> {
        self.inner.diagnostics(path)
    }

    fn all_diagnostics(&self) -> marker_store::Result<Vec<Diagnostic>> {
        self.inner.all_diagnostics()
    }

    fn begin_operation(&self) -> marker_store::Result<()> {
        self.inner.begin_operation()
    }

    fn end_operation(&self) -> marker_store::Result<()> {
        self.inner.end_operation()
    }
}

use crate::analysis::{Analyzer, Issue, OptionOutcome};
use crate::configuration::OptionValue;
use crate::errors::AnalyzerError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessAnalyzerConfig {
    pub command: PathBuf,
    pub args: Vec<String>,
    pub timeout: Duration,
    /// Options the external linter understands; `None` accepts every option
    pub supported_options: Option<BTreeSet<String>>,
}

impl ProcessAnalyzerConfig {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            supported_options: None,
        }
    }
}

/// Runs an external linter once per file.
///
/// The request is written as JSON to the child's stdin:
///
/// ```json
/// {"path": "src/app.js", "options": {"eqeqeq": true, "maxlen": 80}, "source": "..."}
/// ```
///
/// and the child answers on stdout with a JSON array of issues, each carrying a
/// 1-based `line` and a `message` (or JSLint's `reason`). A non-zero exit status,
/// unparsable output or exceeding the timeout fails the analysis.
pub struct ProcessAnalyzer {
    config: Arc<ProcessAnalyzerConfig>,
    options: BTreeMap<String, OptionValue>,
}

#[derive(Serialize)]
struct AnalysisRequest<'a> {
    path: &'a str,
    options: &'a BTreeMap<String, OptionValue>,
    source: &'a str,
}

#[derive(Deserialize)]
struct ReportedIssue {
    #[serde(default)]
    line: u32,
    #[serde(alias = "reason")]
    message: String,
}

impl ProcessAnalyzer {
    pub fn new(config: Arc<ProcessAnalyzerConfig>) -> Self {
        Self {
            config,
            options: BTreeMap::new(),
        }
    }

    pub fn options(&self) -> &BTreeMap<String, OptionValue> {
        &self.options
    }

    fn run(&self, payload: Vec<u8>) -> Result<Vec<u8>, AnalyzerError> {
        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                AnalyzerError::Process(format!(
                    "failed to spawn {}: {e}",
                    self.config.command.display()
                ))
            })?;

        // Feed stdin and drain the output pipes on their own threads so a child that
        // never reads its input still runs into the timeout.
        let stdout_handle = child.stdout.take().map(spawn_reader);
        let stderr_handle = child.stderr.take().map(spawn_reader);
        let stdin_handle = child.stdin.take().map(|stdin| spawn_writer(stdin, payload));

        match child.wait_timeout(self.config.timeout) {
            Ok(Some(_)) => (),
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(AnalyzerError::Timeout(self.config.timeout));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(AnalyzerError::Process(format!(
                    "failed waiting on analyzer: {e}"
                )));
            }
        }

        let status = child
            .wait()
            .map_err(|e| AnalyzerError::Process(format!("failed to reap analyzer: {e}")))?;

        join_writer(stdin_handle)?;
        let stdout = join_reader(stdout_handle, "stdout")?;
        let stderr = join_reader(stderr_handle, "stderr")?;

        if !status.success() {
            let code = status
                .code()
                .map_or_else(|| "terminated".to_string(), |c| c.to_string());
            return Err(AnalyzerError::Process(format!(
                "exited with status {code}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }

        Ok(stdout)
    }
}

impl Analyzer for ProcessAnalyzer {
    fn reset_options(&mut self) {
        self.options.clear();
    }

    fn set_option(&mut self, name: &str, value: &OptionValue) -> OptionOutcome {
        if let Some(supported) = &self.config.supported_options
            && !supported.contains(name)
        {
            return OptionOutcome::Unrecognized;
        }
        if let OptionValue::Integer(n) = value
            && *n < 0
        {
            return OptionOutcome::Rejected(format!("{name} must not be negative"));
        }
        self.options.insert(name.to_string(), value.clone());
        OptionOutcome::Applied
    }

    fn analyze(&self, path: &str, content: &str) -> Result<Vec<Issue>, AnalyzerError> {
        let request = AnalysisRequest {
            path,
            options: &self.options,
            source: content,
        };
        let payload = serde_json::to_vec(&request)
            .map_err(|e| AnalyzerError::Output(format!("failed to encode request: {e}")))?;

        let stdout = self.run(payload)?;
        parse_issues(&stdout)
    }
}

fn parse_issues(stdout: &[u8]) -> Result<Vec<Issue>, AnalyzerError> {
    let text = String::from_utf8_lossy(stdout);
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    // JSLint leaves null holes in its error array when it stops early.
    let reported: Vec<Option<ReportedIssue>> =
        serde_json::from_str(&text).map_err(|e| AnalyzerError::Output(e.to_string()))?;

    Ok(reported
        .into_iter()
        .flatten()
        .map(|issue| Issue::new(issue.line, issue.message))
        .collect())
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn spawn_writer<W: Write + Send + 'static>(
    mut pipe: W,
    payload: Vec<u8>,
) -> JoinHandle<io::Result<()>> {
    thread::spawn(move || -> io::Result<()> {
        pipe.write_all(&payload)?;
        pipe.flush()
    })
}

// A child may exit without consuming all of its input; that is not a write failure.
fn join_writer(handle: Option<JoinHandle<io::Result<()>>>) -> Result<(), AnalyzerError> {
    let Some(handle) = handle else {
        return Ok(());
    };
    match handle.join() {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Ok(Err(e)) => Err(AnalyzerError::Process(format!(
            "failed to write analyzer stdin: {e}"
        ))),
        Err(_) => Err(AnalyzerError::Process("stdin writer panicked".to_string())),
    }
}

fn join_reader(
    handle: Option<JoinHandle<io::Result<Vec<u8>>>>,
    stream: &str,
) -> Result<Vec<u8>, AnalyzerError> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| AnalyzerError::Process(format!("{stream} reader panicked")))?
            .map_err(|e| AnalyzerError::Process(format!("failed to read analyzer {stream}: {e}"))),
        None => Ok(Vec::new()),
    }
}

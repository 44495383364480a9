//! `.jslint.toml`: the analyzer to run and the preferences to lint with.
//!
//! ```toml
//! [analyzer]
//! command = "tools/jslint-json"
//! args = ["--stdin"]
//! timeout_secs = 10
//!
//! [engine]
//! extensions = ["js", "mjs"]
//!
//! [preferences]
//! eqeqeq = true
//! maxlen = 100
//! predef = ["jQuery", "window"]
//! exclude_path_regexes = "vendor/.*, .*\\.min\\.js"
//! ```

use anyhow::{Context, Result};
use lint_engine::analysis::ProcessAnalyzerConfig;
use lint_engine::execution::EngineConfigBuilder;
use lint_engine::{EngineConfig, PreferenceStore};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const SETTINGS_FILE_NAME: &str = ".jslint.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub analyzer: Option<AnalyzerSettings>,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub preferences: toml::Table,
    /// Directory the settings were read from; relative commands resolve against it
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzerSettings {
    pub command: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    pub timeout_secs: Option<u64>,
    /// Options the analyzer understands; every option is passed when omitted
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSettings {
    pub namespace: Option<String>,
    pub extensions: Option<Vec<String>>,
    pub max_file_size: Option<usize>,
}

impl Settings {
    /// Read `explicit`, or `.jslint.toml` in `project_root` when no file was given.
    ///
    /// A missing default file yields empty settings; a missing explicit file is an error.
    pub fn load(project_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = project_root.join(SETTINGS_FILE_NAME);
                if !path.exists() {
                    debug!("No {SETTINGS_FILE_NAME} in {}", project_root.display());
                    return Ok(Self {
                        base_dir: project_root.to_path_buf(),
                        ..Self::default()
                    });
                }
                path
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let mut settings = Self::parse(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        settings.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| project_root.to_path_buf());
        Ok(settings)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut builder = EngineConfigBuilder::new();
        if let Some(namespace) = &self.engine.namespace {
            builder = builder.namespace(namespace.clone());
        }
        if let Some(extensions) = &self.engine.extensions {
            builder = builder.source_extensions(extensions.iter().cloned());
        }
        if let Some(max_file_size) = self.engine.max_file_size {
            builder = builder.max_file_size(max_file_size);
        }
        builder.build()
    }

    /// JSLint defaults overlaid with the `[preferences]` table.
    pub fn preference_store(&self, namespace: &str) -> Result<PreferenceStore> {
        let store = PreferenceStore::with_jslint_defaults(namespace);
        let applied = store
            .load_toml(namespace, &self.preferences)
            .context("Invalid [preferences]")?;
        debug!("Applied {applied} preference(s) to {namespace}");
        Ok(store)
    }

    pub fn analyzer_config(&self) -> Option<ProcessAnalyzerConfig> {
        let analyzer = self.analyzer.as_ref()?;

        let mut config = ProcessAnalyzerConfig::new(self.resolve_command(&analyzer.command));
        config.args = analyzer.args.clone();
        if let Some(timeout_secs) = analyzer.timeout_secs {
            config.timeout = Duration::from_secs(timeout_secs);
        }
        config.supported_options = analyzer
            .options
            .as_ref()
            .map(|options| options.iter().cloned().collect::<BTreeSet<_>>());
        Some(config)
    }

    // Bare names are looked up on PATH; anything with a directory part is
    // relative to the settings file.
    fn resolve_command(&self, command: &Path) -> PathBuf {
        if command.is_absolute() || command.components().count() == 1 {
            command.to_path_buf()
        } else {
            self.base_dir.join(command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lint_engine::configuration::ConfigurationSource;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_settings() {
        let settings = Settings::parse(
            r#"
            [analyzer]
            command = "jslint-json"
            args = ["--stdin"]
            timeout_secs = 5
            options = ["eqeqeq", "maxlen"]

            [engine]
            extensions = ["js", "MJS"]

            [preferences]
            maxlen = 100
            exclude_path_regexes = "vendor/.*"
            "#,
        )
        .unwrap();

        let analyzer = settings.analyzer_config().unwrap();
        assert_eq!(analyzer.command, PathBuf::from("jslint-json"));
        assert_eq!(analyzer.args, vec!["--stdin".to_string()]);
        assert_eq!(analyzer.timeout, Duration::from_secs(5));
        assert_eq!(analyzer.supported_options.unwrap().len(), 2);

        let config = settings.engine_config();
        assert_eq!(config.source_extensions, vec!["js".to_string(), "MJS".to_string()]);

        let store = settings.preference_store(&config.namespace).unwrap();
        assert_eq!(store.get_int(&config.namespace, "maxlen", 0), 100);
        assert_eq!(
            store.get_string(&config.namespace, "exclude_path_regexes", ""),
            "vendor/.*"
        );
        assert!(store.get_boolean(&config.namespace, "eqeqeq", false));
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let error = Settings::parse("[linter]\ncommand = \"x\"\n").unwrap_err();
        assert!(error.to_string().contains("linter"));
    }

    #[test]
    fn test_missing_default_file_yields_empty_settings() {
        let temp_dir = TempDir::new().unwrap();

        let settings = Settings::load(temp_dir.path(), None).unwrap();

        assert!(settings.analyzer.is_none());
        assert!(settings.preferences.is_empty());
        assert_eq!(settings.base_dir, temp_dir.path());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");

        assert!(Settings::load(temp_dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn test_relative_command_resolves_against_settings_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(SETTINGS_FILE_NAME),
            "[analyzer]\ncommand = \"tools/lint.sh\"\n",
        )
        .unwrap();

        let settings = Settings::load(temp_dir.path(), None).unwrap();

        assert_eq!(
            settings.analyzer_config().unwrap().command,
            temp_dir.path().join("tools/lint.sh")
        );
    }

    #[test]
    fn test_invalid_preference_value_is_reported() {
        let settings = Settings::parse("[preferences]\nmaxlen = 1.5\n").unwrap();

        let error = settings.preference_store("jslint4java").unwrap_err();
        assert!(format!("{error:#}").contains("maxlen"));
    }
}

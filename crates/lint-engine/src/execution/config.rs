use crate::configuration::OptionCatalog;

pub const DEFAULT_NAMESPACE: &str = "jslint4java";
pub const EXCLUSION_KEY: &str = "exclude_path_regexes";
pub const DEFAULT_MAX_FILE_SIZE: usize = 5_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Preference namespace options and exclusions are read from
    pub namespace: String,
    /// Preference key holding the comma separated exclusion spec
    pub exclusion_key: String,
    /// File extensions treated as sources, without the dot
    pub source_extensions: Vec<String>,
    pub max_file_size: usize,
    pub catalog: OptionCatalog,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfigBuilder::new().build()
    }
}

pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig {
                namespace: DEFAULT_NAMESPACE.to_string(),
                exclusion_key: EXCLUSION_KEY.to_string(),
                source_extensions: vec!["js".to_string()],
                max_file_size: DEFAULT_MAX_FILE_SIZE,
                catalog: OptionCatalog::jslint(),
            },
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    pub fn exclusion_key(mut self, key: impl Into<String>) -> Self {
        self.config.exclusion_key = key.into();
        self
    }

    /// Extensions may be given with or without a leading dot. An empty list keeps
    /// the defaults.
    pub fn source_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions: Vec<String> = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
        if !extensions.is_empty() {
            self.config.source_extensions = extensions;
        }
        self
    }

    pub fn max_file_size(mut self, bytes: usize) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn catalog(mut self, catalog: OptionCatalog) -> Self {
        self.config.catalog = catalog;
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();

        assert_eq!(config.namespace, "jslint4java");
        assert_eq!(config.exclusion_key, "exclude_path_regexes");
        assert_eq!(config.source_extensions, vec!["js"]);
        assert_eq!(config.max_file_size, 5_000_000);
        assert!(config.catalog.get("eqeqeq").is_some());
    }

    #[test]
    fn test_source_extensions_are_normalized() {
        let config = EngineConfigBuilder::new()
            .source_extensions([".js", "mjs ", ""])
            .build();
        assert_eq!(config.source_extensions, vec!["js", "mjs"]);

        let config = EngineConfigBuilder::new()
            .source_extensions(Vec::<String>::new())
            .build();
        assert_eq!(config.source_extensions, vec!["js"]);
    }
}

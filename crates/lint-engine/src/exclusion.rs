//! Path exclusion rules.
//!
//! Users exclude generated or vendored code with a comma separated list of regular
//! expressions, e.g. `vendor/,\.min\.js$`. A path is excluded when any expression
//! matches anywhere inside it.

use crate::errors::ConfigurationError;
use regex::Regex;

/// Compiled exclusion rule set. Rebuilt wholesale, never mutated.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    spec: String,
    patterns: Vec<Regex>,
}

impl ExclusionRules {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile a comma separated spec. Blank fragments are skipped; the first
    /// malformed fragment rejects the whole spec.
    pub fn compile(spec: &str) -> Result<Self, ConfigurationError> {
        let mut patterns = Vec::new();
        let mut offset = 0;

        for (index, raw) in spec.split(',').enumerate() {
            let fragment = raw.trim();
            if !fragment.is_empty() {
                let pattern = Regex::new(fragment).map_err(|source| {
                    ConfigurationError::InvalidExclusionPattern {
                        fragment: fragment.to_string(),
                        index,
                        offset: offset + (raw.len() - raw.trim_start().len()),
                        source: Box::new(source),
                    }
                })?;
                patterns.push(pattern);
            }
            offset += raw.len() + 1;
        }

        Ok(Self {
            spec: spec.to_string(),
            patterns,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(path))
    }

    /// The comma separated text these rules were compiled from
    pub fn spec(&self) -> &str {
        &self.spec
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

pub fn compile(spec: &str) -> Result<ExclusionRules, ConfigurationError> {
    ExclusionRules::compile(spec)
}

pub fn matches(path: &str, rules: &ExclusionRules) -> bool {
    rules.matches(path)
}

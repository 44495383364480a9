use crate::configuration::catalog::OptionCatalog;
use crate::configuration::preferences::ConfigurationSource;
use crate::configuration::{OptionKind, OptionValue};
use std::collections::BTreeMap;

/// Immutable view of the analyzer options at one point in time.
///
/// A new snapshot with a higher generation replaces the old one on every preference
/// change; snapshots themselves never change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationSnapshot {
    generation: u64,
    options: BTreeMap<String, OptionValue>,
}

impl ConfigurationSnapshot {
    pub fn new(generation: u64, options: BTreeMap<String, OptionValue>) -> Self {
        Self {
            generation,
            options,
        }
    }

    /// Read every catalogued option from `source`.
    ///
    /// Booleans are always captured (unset reads as `false`); integers and lists only
    /// when the source holds a value for them.
    pub fn capture(
        source: &dyn ConfigurationSource,
        namespace: &str,
        catalog: &OptionCatalog,
        generation: u64,
    ) -> Self {
        let mut options = BTreeMap::new();

        for spec in catalog.iter() {
            let value = match spec.kind {
                OptionKind::Boolean => {
                    OptionValue::Boolean(source.get_boolean(namespace, spec.name, false))
                }
                OptionKind::Integer if source.contains(namespace, spec.name) => {
                    OptionValue::Integer(source.get_int(namespace, spec.name, 0))
                }
                OptionKind::StringList if source.contains(namespace, spec.name) => {
                    OptionValue::StringList(source.get_string_list(namespace, spec.name, &[]))
                }
                _ => continue,
            };
            options.insert(spec.name.to_string(), value);
        }

        Self::new(generation, options)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        matches!(self.options.get(name), Some(OptionValue::Boolean(true)))
    }

    /// Options in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.options.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn enabled_flags(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, value)| matches!(value, OptionValue::Boolean(true)))
            .map(|(name, _)| name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::preferences::PreferenceStore;

    const NS: &str = "jslint4java";

    #[test]
    fn test_capture_defaults() {
        let store = PreferenceStore::with_jslint_defaults(NS);
        let snapshot = ConfigurationSnapshot::capture(&store, NS, &OptionCatalog::jslint(), 1);

        assert_eq!(snapshot.generation(), 1);
        assert_eq!(snapshot.enabled_flags(), vec!["eqeqeq", "undef", "white"]);
        assert_eq!(snapshot.get("plusplus"), Some(&OptionValue::Boolean(false)));
        assert_eq!(snapshot.get("maxlen"), None);
        assert_eq!(snapshot.get("predef"), None);
    }

    #[test]
    fn test_capture_typed_values() {
        let store = PreferenceStore::new();
        store.set(NS, "maxlen", 80_i64);
        store.set(NS, "predef", vec!["jQuery".to_string()]);
        store.set(NS, "unknown_option", true);

        let snapshot = ConfigurationSnapshot::capture(&store, NS, &OptionCatalog::jslint(), 3);

        assert_eq!(snapshot.get("maxlen"), Some(&OptionValue::Integer(80)));
        assert_eq!(
            snapshot.get("predef"),
            Some(&OptionValue::StringList(vec!["jQuery".to_string()]))
        );
        assert_eq!(snapshot.get("unknown_option"), None);
        assert!(snapshot.enabled_flags().is_empty());
    }
}

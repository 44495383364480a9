use crate::configuration::catalog::DEFAULT_ENABLED_OPTIONS;
use crate::errors::ConfigurationError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;

pub type SubscriptionId = u64;

/// Called synchronously after a preference in the subscribed namespace changed.
pub type ChangeListener = Arc<dyn Fn(&PreferenceChange) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceChange {
    pub namespace: String,
    pub key: String,
}

/// Read access to namespaced preferences plus change notification.
pub trait ConfigurationSource: Send + Sync {
    fn get_boolean(&self, namespace: &str, key: &str, default: bool) -> bool;

    fn get_int(&self, namespace: &str, key: &str, default: i64) -> i64;

    fn get_string(&self, namespace: &str, key: &str, default: &str) -> String;

    fn get_string_list(&self, namespace: &str, key: &str, default: &[String]) -> Vec<String>;

    /// Whether the key has a value in any scope
    fn contains(&self, namespace: &str, key: &str) -> bool;

    fn subscribe(&self, namespace: &str, listener: ChangeListener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Raw stored preference value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceValue {
    Boolean(bool),
    Integer(i64),
    String(String),
    StringList(Vec<String>),
}

impl From<bool> for PreferenceValue {
    fn from(value: bool) -> Self {
        PreferenceValue::Boolean(value)
    }
}

impl From<i64> for PreferenceValue {
    fn from(value: i64) -> Self {
        PreferenceValue::Integer(value)
    }
}

impl From<&str> for PreferenceValue {
    fn from(value: &str) -> Self {
        PreferenceValue::String(value.to_string())
    }
}

impl From<String> for PreferenceValue {
    fn from(value: String) -> Self {
        PreferenceValue::String(value)
    }
}

impl From<Vec<String>> for PreferenceValue {
    fn from(value: Vec<String>) -> Self {
        PreferenceValue::StringList(value)
    }
}

impl PreferenceValue {
    fn from_toml(key: &str, value: &toml::Value) -> Result<Self, ConfigurationError> {
        let unsupported = |message: &str| ConfigurationError::UnsupportedPreferenceValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        match value {
            toml::Value::Boolean(b) => Ok(PreferenceValue::Boolean(*b)),
            toml::Value::Integer(i) => Ok(PreferenceValue::Integer(*i)),
            toml::Value::String(s) => Ok(PreferenceValue::String(s.clone())),
            toml::Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    toml::Value::String(s) => Ok(s.clone()),
                    _ => Err(unsupported("arrays may only contain strings")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(PreferenceValue::StringList),
            _ => Err(unsupported(
                "expected a boolean, integer, string or array of strings",
            )),
        }
    }
}

struct Subscription {
    id: SubscriptionId,
    namespace: String,
    listener: ChangeListener,
}

type PreferenceKey = (String, String);

/// In-memory preference store with an instance scope layered over a default scope.
///
/// Lookups fall back from instance to default to the caller's default. Values are
/// coerced leniently the way string-backed preference files behave: `"true"` reads
/// as a boolean, `"80"` as an integer, `"a, b"` as a list.
pub struct PreferenceStore {
    values: RwLock<HashMap<PreferenceKey, PreferenceValue>>,
    defaults: RwLock<HashMap<PreferenceKey, PreferenceValue>>,
    subscriptions: Mutex<Vec<Subscription>>,
    next_subscription: AtomicU64,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore").finish_non_exhaustive()
    }
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            defaults: RwLock::new(HashMap::new()),
            subscriptions: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// A store whose default scope enables the standard option set
    pub fn with_jslint_defaults(namespace: &str) -> Self {
        let store = Self::new();
        for option in DEFAULT_ENABLED_OPTIONS {
            store.set_default(namespace, option, true);
        }
        store
    }

    /// Set a default-scope value. Defaults never notify listeners.
    pub fn set_default(&self, namespace: &str, key: &str, value: impl Into<PreferenceValue>) {
        self.defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(preference_key(namespace, key), value.into());
    }

    pub fn set(&self, namespace: &str, key: &str, value: impl Into<PreferenceValue>) {
        let value = value.into();
        let previous = self
            .values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(preference_key(namespace, key), value.clone());

        if previous.as_ref() != Some(&value) {
            self.notify(namespace, key);
        }
    }

    pub fn remove(&self, namespace: &str, key: &str) {
        let removed = self
            .values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&preference_key(namespace, key));

        if removed.is_some() {
            self.notify(namespace, key);
        }
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<PreferenceValue> {
        let key = preference_key(namespace, key);
        if let Some(value) = self
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Some(value.clone());
        }
        self.defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Apply every entry of a TOML table as an instance value of `namespace`.
    ///
    /// The table is validated first; nothing is applied if any value is unsupported.
    pub fn load_toml(&self, namespace: &str, table: &toml::Table) -> Result<usize, ConfigurationError> {
        let values = table
            .iter()
            .map(|(key, value)| Ok((key.clone(), PreferenceValue::from_toml(key, value)?)))
            .collect::<Result<Vec<_>, ConfigurationError>>()?;

        let count = values.len();
        for (key, value) in values {
            self.set(namespace, &key, value);
        }
        Ok(count)
    }

    /// Parse `content` as TOML and apply it with [`PreferenceStore::load_toml`].
    pub fn load_toml_str(&self, namespace: &str, content: &str) -> Result<usize, ConfigurationError> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| ConfigurationError::InvalidPreferences {
                path: None,
                message: e.to_string(),
            })?;
        self.load_toml(namespace, &table)
    }

    fn notify(&self, namespace: &str, key: &str) {
        debug!("Preference changed: {namespace}/{key}");

        let listeners: Vec<ChangeListener> = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|subscription| subscription.namespace == namespace)
            .map(|subscription| Arc::clone(&subscription.listener))
            .collect();

        let change = PreferenceChange {
            namespace: namespace.to_string(),
            key: key.to_string(),
        };
        for listener in listeners {
            listener(&change);
        }
    }
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationSource for PreferenceStore {
    fn get_boolean(&self, namespace: &str, key: &str, default: bool) -> bool {
        match self.get(namespace, key) {
            Some(PreferenceValue::Boolean(value)) => value,
            Some(PreferenceValue::String(value)) => value.trim().eq_ignore_ascii_case("true"),
            _ => default,
        }
    }

    fn get_int(&self, namespace: &str, key: &str, default: i64) -> i64 {
        match self.get(namespace, key) {
            Some(PreferenceValue::Integer(value)) => value,
            Some(PreferenceValue::String(value)) => value.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    fn get_string(&self, namespace: &str, key: &str, default: &str) -> String {
        match self.get(namespace, key) {
            Some(PreferenceValue::String(value)) => value,
            Some(PreferenceValue::Boolean(value)) => value.to_string(),
            Some(PreferenceValue::Integer(value)) => value.to_string(),
            Some(PreferenceValue::StringList(values)) => values.join(","),
            None => default.to_string(),
        }
    }

    fn get_string_list(&self, namespace: &str, key: &str, default: &[String]) -> Vec<String> {
        match self.get(namespace, key) {
            Some(PreferenceValue::StringList(values)) => values,
            Some(PreferenceValue::String(value)) => value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            _ => default.to_vec(),
        }
    }

    fn contains(&self, namespace: &str, key: &str) -> bool {
        self.get(namespace, key).is_some()
    }

    fn subscribe(&self, namespace: &str, listener: ChangeListener) -> SubscriptionId {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscription {
                id,
                namespace: namespace.to_string(),
                listener,
            });
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|subscription| subscription.id != id);
    }
}

fn preference_key(namespace: &str, key: &str) -> PreferenceKey {
    (namespace.to_string(), key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const NS: &str = "jslint4java";

    #[test]
    fn test_defaults_enable_standard_options() {
        let store = PreferenceStore::with_jslint_defaults(NS);

        assert!(store.get_boolean(NS, "eqeqeq", false));
        assert!(store.get_boolean(NS, "undef", false));
        assert!(store.get_boolean(NS, "white", false));
        assert!(!store.get_boolean(NS, "plusplus", false));
        assert!(!store.get_boolean("other", "eqeqeq", false));
    }

    #[test]
    fn test_instance_scope_overrides_defaults() {
        let store = PreferenceStore::with_jslint_defaults(NS);
        store.set(NS, "white", false);
        assert!(!store.get_boolean(NS, "white", true));

        store.remove(NS, "white");
        assert!(store.get_boolean(NS, "white", false));
    }

    #[test]
    fn test_lenient_coercion() {
        let store = PreferenceStore::new();
        store.set(NS, "devel", "true");
        store.set(NS, "maxlen", "120");
        store.set(NS, "predef", "jQuery, $ ,,window");

        assert!(store.get_boolean(NS, "devel", false));
        assert_eq!(store.get_int(NS, "maxlen", 0), 120);
        assert_eq!(
            store.get_string_list(NS, "predef", &[]),
            vec!["jQuery", "$", "window"]
        );
        assert_eq!(store.get_string(NS, "maxlen", ""), "120");
        assert_eq!(store.get_int(NS, "missing", 7), 7);
    }

    #[test]
    fn test_listeners_fire_on_actual_changes_only() {
        let store = PreferenceStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let id = store.subscribe(
            NS,
            Arc::new(move |change| {
                assert_eq!(change.key, "eqeqeq");
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );

        store.set(NS, "eqeqeq", true);
        store.set(NS, "eqeqeq", true);
        store.set("other", "eqeqeq", false);
        store.set_default(NS, "eqeqeq", false);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        store.unsubscribe(id);
        store.set(NS, "eqeqeq", false);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_load_toml() {
        let store = PreferenceStore::new();
        let count = store
            .load_toml_str(
                NS,
                r#"
                eqeqeq = true
                maxlen = 100
                exclude_path_regexes = "vendor/"
                predef = ["jQuery", "$"]
                "#,
            )
            .unwrap();

        assert_eq!(count, 4);
        assert!(store.get_boolean(NS, "eqeqeq", false));
        assert_eq!(store.get_int(NS, "maxlen", 0), 100);
        assert_eq!(store.get_string(NS, "exclude_path_regexes", ""), "vendor/");
        assert_eq!(store.get_string_list(NS, "predef", &[]), vec!["jQuery", "$"]);
    }

    #[test]
    fn test_load_toml_rejects_unsupported_values_atomically() {
        let store = PreferenceStore::new();
        let err = store
            .load_toml_str(NS, "eqeqeq = true\nratio = 0.5\n")
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigurationError::UnsupportedPreferenceValue { ref key, .. } if key == "ratio"
        ));
        assert!(!store.contains(NS, "eqeqeq"));
    }
}

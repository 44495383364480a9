use crate::configuration::preferences::{
    ConfigurationSource, PreferenceChange, SubscriptionId,
};
use crate::configuration::snapshot::ConfigurationSnapshot;
use crate::exclusion::ExclusionRules;
use crate::execution::config::EngineConfig;
use arc_swap::ArcSwap;
use chrono::Utc;
use event_bus::{
    ConfigurationChanged, ConfigurationEvent, EventBus, ExclusionRejected, LintEvent,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::{debug, info, warn};

/// Session-wide configuration state shared by every build driver.
///
/// Holds the current option snapshot and exclusion rules together behind a single
/// atomically swapped pointer. A change notification from the configuration source
/// replaces the snapshot (and, for the exclusion key only, the rules) in one store.
/// Readers load the pointer once and keep a consistent view for as long as they
/// hold it.
///
/// Cloning is cheap; the source subscription is released when the last clone drops.
#[derive(Clone)]
pub struct ConfigurationContext {
    inner: Arc<ContextInner>,
}

/// An option snapshot and the exclusion rules that were current with it.
#[derive(Debug, Clone)]
pub struct ConfigurationView {
    pub snapshot: Arc<ConfigurationSnapshot>,
    pub exclusions: Arc<ExclusionRules>,
}

struct ContextInner {
    source: Arc<dyn ConfigurationSource>,
    config: Arc<EngineConfig>,
    current: ArcSwap<ConfigurationView>,
    generation: AtomicU64,
    refresh: Mutex<()>,
    event_bus: Option<Arc<EventBus>>,
    subscription: OnceLock<SubscriptionId>,
}

impl ConfigurationContext {
    pub fn new(
        source: Arc<dyn ConfigurationSource>,
        config: Arc<EngineConfig>,
        event_bus: Option<Arc<EventBus>>,
    ) -> Self {
        let snapshot =
            ConfigurationSnapshot::capture(source.as_ref(), &config.namespace, &config.catalog, 1);
        let spec = source.get_string(&config.namespace, &config.exclusion_key, "");
        let exclusions = match ExclusionRules::compile(&spec) {
            Ok(rules) => rules,
            Err(e) => {
                warn!("Ignoring exclusion spec '{spec}': {e}");
                ExclusionRules::empty()
            }
        };

        let inner = Arc::new(ContextInner {
            source,
            config,
            current: ArcSwap::from_pointee(ConfigurationView {
                snapshot: Arc::new(snapshot),
                exclusions: Arc::new(exclusions),
            }),
            generation: AtomicU64::new(1),
            refresh: Mutex::new(()),
            event_bus,
            subscription: OnceLock::new(),
        });

        let weak = Arc::downgrade(&inner);
        let id = inner.source.subscribe(
            &inner.config.namespace,
            Arc::new(move |change: &PreferenceChange| {
                if let Some(inner) = weak.upgrade() {
                    inner.handle_change(change);
                }
            }),
        );
        let _ = inner.subscription.set(id);

        Self { inner }
    }

    /// The current snapshot and exclusion rules, loaded together
    pub fn view(&self) -> Arc<ConfigurationView> {
        self.inner.current.load_full()
    }

    /// The current option snapshot
    pub fn snapshot(&self) -> Arc<ConfigurationSnapshot> {
        Arc::clone(&self.inner.current.load().snapshot)
    }

    /// The current exclusion rules
    pub fn exclusion_rules(&self) -> Arc<ExclusionRules> {
        Arc::clone(&self.inner.current.load().exclusions)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn source(&self) -> &Arc<dyn ConfigurationSource> {
        &self.inner.source
    }

    /// Generation of the current snapshot
    pub fn generation(&self) -> u64 {
        self.inner.current.load().snapshot.generation()
    }
}

impl ContextInner {
    fn handle_change(&self, change: &PreferenceChange) {
        // Serialize rebuilds so the last stored snapshot reflects the last read.
        let _guard = self.refresh.lock().unwrap_or_else(PoisonError::into_inner);

        let recompiled = if change.key == self.config.exclusion_key {
            self.recompile_exclusions()
        } else {
            None
        };
        let exclusions =
            recompiled.unwrap_or_else(|| Arc::clone(&self.current.load().exclusions));

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = ConfigurationSnapshot::capture(
            self.source.as_ref(),
            &self.config.namespace,
            &self.config.catalog,
            generation,
        );
        self.current.store(Arc::new(ConfigurationView {
            snapshot: Arc::new(snapshot),
            exclusions,
        }));
        debug!(
            "Configuration snapshot {generation} installed after change to '{}'",
            change.key
        );

        self.send(LintEvent::Configuration(ConfigurationEvent::Changed(
            ConfigurationChanged {
                namespace: change.namespace.clone(),
                key: change.key.clone(),
                changed_at: Utc::now(),
            },
        )));
    }

    /// New rules for the exclusion key, or `None` to keep the current ones.
    fn recompile_exclusions(&self) -> Option<Arc<ExclusionRules>> {
        let spec = self
            .source
            .get_string(&self.config.namespace, &self.config.exclusion_key, "");

        match ExclusionRules::compile(&spec) {
            Ok(rules) => {
                info!("Exclusion rules updated: {} pattern(s)", rules.len());
                Some(Arc::new(rules))
            }
            Err(e) => {
                warn!("Rejected exclusion spec '{spec}', keeping previous rules: {e}");
                self.send(LintEvent::Configuration(
                    ConfigurationEvent::ExclusionRejected(ExclusionRejected {
                        spec,
                        error: e.to_string(),
                        rejected_at: Utc::now(),
                    }),
                ));
                None
            }
        }
    }

    fn send(&self, event: LintEvent) {
        if let Some(event_bus) = &self.event_bus {
            event_bus.send(&event);
        }
    }
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.get() {
            self.source.unsubscribe(*id);
        }
    }
}

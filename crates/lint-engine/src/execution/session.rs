use crate::analysis::{AnalyzerCache, AnalyzerFactory};
use crate::configuration::{ConfigurationContext, ConfigurationSource};
use crate::execution::config::EngineConfig;
use event_bus::EventBus;
use std::sync::Arc;

/// State shared by every build driver of one workspace session: the configuration
/// context, the analyzer cache built on it, and the event bus.
///
/// Dropping the last clone releases the configuration subscription.
#[derive(Clone)]
pub struct LintSession {
    context: ConfigurationContext,
    cache: Arc<AnalyzerCache>,
    event_bus: Arc<EventBus>,
}

impl LintSession {
    pub fn new(
        source: Arc<dyn ConfigurationSource>,
        factory: Arc<dyn AnalyzerFactory>,
        event_bus: Arc<EventBus>,
        config: EngineConfig,
    ) -> Self {
        let context =
            ConfigurationContext::new(source, Arc::new(config), Some(Arc::clone(&event_bus)));
        let cache = Arc::new(AnalyzerCache::new(context.clone(), factory));
        Self {
            context,
            cache,
            event_bus,
        }
    }

    pub fn context(&self) -> &ConfigurationContext {
        &self.context
    }

    pub fn config(&self) -> &EngineConfig {
        self.context.config()
    }

    pub fn cache(&self) -> &AnalyzerCache {
        &self.cache
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

use crate::config::EngineConfig;
use crate::events::EventPublisher;
use crate::registry::{ConfigurationHost, ServiceRegistry};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// External collaborators shared by every component instance of a platform
#[derive(Clone)]
pub struct PlatformContext {
    pub registry: Arc<dyn ServiceRegistry>,
    pub configuration_host: Arc<dyn ConfigurationHost>,
    pub events: EventPublisher,
    pub config: EngineConfig,
}

impl PlatformContext {
    pub fn new(
        registry: Arc<dyn ServiceRegistry>,
        configuration_host: Arc<dyn ConfigurationHost>,
    ) -> Self {
        Self::with_config(registry, configuration_host, EngineConfig::default())
    }

    pub fn with_config(
        registry: Arc<dyn ServiceRegistry>,
        configuration_host: Arc<dyn ConfigurationHost>,
        config: EngineConfig,
    ) -> Self {
        if let Err(e) = config.validate() {
            warn!(error = %e, "Using an engine configuration that does not validate");
        }
        Self {
            registry,
            configuration_host,
            events: EventPublisher::new(config.event_channel_capacity),
            config,
        }
    }
}

impl fmt::Debug for PlatformContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformContext")
            .field("registry", &"<Arc<dyn ServiceRegistry>>")
            .field("configuration_host", &"<Arc<dyn ConfigurationHost>>")
            .field("events", &self.events)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{InMemoryConfigurationHost, InMemoryServiceRegistry};
    use serde_json::json;

    #[test]
    fn test_zero_capacity_config_builds_working_context() {
        let context = PlatformContext::with_config(
            Arc::new(InMemoryServiceRegistry::new()),
            Arc::new(InMemoryConfigurationHost::new()),
            EngineConfig {
                event_channel_capacity: 0,
                ..EngineConfig::default()
            },
        );
        let mut receiver = context.events.subscribe();
        context.events.publish("service.registered", json!({}));
        assert_eq!(receiver.try_recv().unwrap().name, "service.registered");
    }
}

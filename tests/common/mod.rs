//! Shared fixtures for integration and property tests

#![allow(dead_code)] // Not every test binary uses every fixture

pub mod strategies;

use lifecycle_core::component::{ComponentManager, ComponentType, PlatformContext};
use lifecycle_core::config::EngineConfig;
use lifecycle_core::handlers::default_handlers;
use lifecycle_core::logging::init_structured_logging;
use lifecycle_core::metadata::{ComponentMetadata, Element};
use lifecycle_core::registry::{InMemoryConfigurationHost, InMemoryServiceRegistry};
use lifecycle_core::value::Dictionary;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const THERMOMETER: &str = "com.acme.Thermometer";

/// In-memory collaborators plus the context wired to them
pub struct Platform {
    pub registry: Arc<InMemoryServiceRegistry>,
    pub host: Arc<InMemoryConfigurationHost>,
    pub context: PlatformContext,
}

impl Platform {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        init_structured_logging();
        let registry = Arc::new(InMemoryServiceRegistry::new());
        let host = Arc::new(InMemoryConfigurationHost::new());
        let context = PlatformContext::with_config(registry.clone(), host.clone(), config);
        Self {
            registry,
            host,
            context,
        }
    }

    /// A manager configured with the standard handler set
    pub fn instantiate(
        &self,
        metadata: ComponentMetadata,
        component_type: ComponentType,
        configuration: &Dictionary,
    ) -> Arc<ComponentManager> {
        let manager = ComponentManager::new(metadata, component_type, self.context.clone());
        manager.configure(default_handlers(), configuration);
        manager
    }
}

pub fn dict(entries: &[(&str, Value)]) -> Dictionary {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Thermometer declaring a configurable `level` property, a `Sensor` service
/// with a literal `unit` property and an `onActivate` callback.
pub fn thermometer_metadata() -> ComponentMetadata {
    ComponentMetadata::builder(THERMOMETER)
        .interface("Sensor")
        .field("m_level", "java.lang.String")
        .element(
            Element::new("Properties")
                .with_attribute("configurable", "true")
                .with_element(
                    Element::new("Property")
                        .with_attribute("name", "level")
                        .with_attribute("field", "m_level")
                        .with_attribute("value", "1"),
                ),
        )
        .element(
            Element::new("Provides")
                .with_attribute("interface", "Sensor")
                .with_element(
                    Element::new("Property")
                        .with_attribute("name", "unit")
                        .with_attribute("value", "celsius"),
                ),
        )
        .element(
            Element::new("callback")
                .with_attribute("initial", "INVALID")
                .with_attribute("final", "VALID")
                .with_attribute("method", "onActivate"),
        )
        .build()
}

/// Method table whose `onActivate` bumps the returned counter
pub fn thermometer_type() -> (ComponentType, Arc<AtomicUsize>) {
    let activations = Arc::new(AtomicUsize::new(0));
    let counter = activations.clone();
    let component_type = ComponentType::new(THERMOMETER).with_method("onActivate", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    (component_type, activations)
}

//! # Handlers
//!
//! Pluggable extensions of the component lifecycle. Each handler reads its
//! own part of the component metadata during `configure`, registers itself
//! with the [`ComponentManager`] when it has something to manage, and then
//! reacts to lifecycle calls and field interception.
//!
//! ## Available Handlers
//!
//! - **ProvidedServiceHandler**: validates and publishes the component's services
//! - **ConfigurationHandler**: injects configuration into fields and propagates the rest
//! - **LifecycleCallbackHandler**: calls component methods on state transitions
//!
//! ## Contract
//!
//! Handlers are shared (`Arc`) and use interior mutability; the manager
//! serializes lifecycle calls, while field interception may arrive from any
//! thread. A handler must never call the service registry or the
//! configuration host while holding its own lock.

use crate::component::ComponentManager;
use crate::metadata::ComponentMetadata;
use crate::state_machine::ComponentState;
use crate::value::Dictionary;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

pub mod configuration;
pub mod lifecycle_callback;
pub mod provided_service;

// Re-export main types for easy access
pub use configuration::{ConfigurableProperty, ConfigurationHandler};
pub use lifecycle_callback::{LifecycleCallback, LifecycleCallbackHandler};
pub use provided_service::{Property, ProvidedService, ProvidedServiceHandler};

/// Capability set shared by every handler
pub trait Handler: Any + Send + Sync {
    /// Handler name for identification and logging
    fn name(&self) -> &'static str;

    /// Read metadata and initial configuration; called once per instance
    fn configure(
        &self,
        manager: &Arc<ComponentManager>,
        metadata: &ComponentMetadata,
        configuration: &Dictionary,
    );

    fn start(&self);

    fn stop(&self);

    /// Validity of the component changed
    fn state_changed(&self, _state: ComponentState) {}

    /// A registered field is being written
    fn setter_callback(&self, _field: &str, _value: &Value) {}

    /// A registered field is being read; returns the value the component sees
    fn getter_callback(&self, _field: &str, value: Option<Value>) -> Option<Value> {
        value
    }

    /// Whether this handler lets the component be VALID
    fn is_valid(&self) -> bool {
        true
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// The standard handler set, in configuration order
pub fn default_handlers() -> Vec<Arc<dyn Handler>> {
    vec![
        ProvidedServiceHandler::new() as Arc<dyn Handler>,
        ConfigurationHandler::new() as Arc<dyn Handler>,
        LifecycleCallbackHandler::new() as Arc<dyn Handler>,
    ]
}

//! # Configuration Handler
//!
//! Maps configuration keys to component fields.
//!
//! ## Overview
//!
//! Each `Property` element under `Properties` becomes a [`ConfigurableProperty`]
//! whose value is injected into the backing field through field interception.
//! When `Properties` is flagged `configurable="true"`, the handler also
//! publishes itself on the configuration host as a live re-configuration
//! endpoint and applies every later update:
//!
//! - keys matching a property are routed through the manager's write path, so
//!   every handler interested in the field sees the change;
//! - other keys are propagated onto the provided services' properties,
//!   replacing whatever the previous update propagated.

use super::configurable_property::ConfigurableProperty;
use crate::component::ComponentManager;
use crate::constants::{attributes, elements, events, system};
use crate::handlers::{Handler, ProvidedServiceHandler};
use crate::logging::{log_error, log_handler_operation};
use crate::metadata::{resolve_initial_value, ComponentMetadata, PropertyInfo};
use crate::registry::{ManagedConfiguration, PublicationHandle};
use crate::state_machine::ComponentState;
use crate::value::{self, is_textual, Dictionary};
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use std::any::Any;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, warn};

#[derive(Debug, Default)]
struct ConfigurationState {
    properties: Vec<Arc<ConfigurableProperty>>,
    propagated: Dictionary,
    identity: String,
    configurable: bool,
    publication: Option<PublicationHandle>,
}

/// Handler injecting configuration into component fields
#[derive(Debug)]
pub struct ConfigurationHandler {
    this: Weak<ConfigurationHandler>,
    manager: RwLock<Weak<ComponentManager>>,
    state: Mutex<ConfigurationState>,
}

impl ConfigurationHandler {
    pub const NAME: &'static str = "configuration";

    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            manager: RwLock::new(Weak::new()),
            state: Mutex::new(ConfigurationState::default()),
        })
    }

    fn manager(&self) -> Option<Arc<ComponentManager>> {
        self.manager.read().upgrade()
    }

    /// Add a property unless this very instance is already held.
    ///
    /// Two distinct properties may share a name.
    pub fn add_property(&self, property: Arc<ConfigurableProperty>) {
        let mut state = self.state.lock();
        if state.properties.iter().any(|p| Arc::ptr_eq(p, &property)) {
            return;
        }
        state.properties.push(property);
    }

    pub fn properties(&self) -> Vec<Arc<ConfigurableProperty>> {
        self.state.lock().properties.clone()
    }

    pub fn property(&self, name: &str) -> Option<Arc<ConfigurableProperty>> {
        self.state
            .lock()
            .properties
            .iter()
            .find(|p| p.name() == name)
            .cloned()
    }

    /// Identity the endpoint is published under
    pub fn identity(&self) -> String {
        self.state.lock().identity.clone()
    }

    pub fn is_configurable(&self) -> bool {
        self.state.lock().configurable
    }

    pub fn is_published(&self) -> bool {
        self.state.lock().publication.is_some()
    }

    /// Entries propagated to the provided services by the last update
    pub fn propagated(&self) -> Dictionary {
        self.state.lock().propagated.clone()
    }

    fn publish(&self) {
        let (identity, previous) = {
            let mut state = self.state.lock();
            if !state.configurable {
                return;
            }
            (state.identity.clone(), state.publication.take())
        };
        let Some(manager) = self.manager() else {
            return;
        };
        let Some(target) = self.this.upgrade() else {
            return;
        };
        let context = manager.context();

        if let Some(previous) = previous {
            if let Err(e) = context.configuration_host.withdraw(previous) {
                debug!(
                    component = %manager.class_name(),
                    error = %e,
                    "Stale publication already gone"
                );
            }
        }

        let mut properties = Dictionary::new();
        properties.insert(context.config.pid_property.clone(), json!(identity));
        properties.insert(
            system::OBJECT_CLASS.to_string(),
            json!([context.config.managed_service_specification]),
        );

        let target: Arc<dyn ManagedConfiguration> = target;
        match context
            .configuration_host
            .publish(&identity, &properties, target)
        {
            Ok(handle) => {
                self.state.lock().publication = Some(handle);
                log_handler_operation(
                    "publish",
                    manager.class_name(),
                    Self::NAME,
                    "published",
                    Some(&identity),
                );
                context.events.publish(
                    events::CONFIGURATION_PUBLISHED,
                    json!({"component": manager.class_name(), "identity": identity}),
                );
            }
            Err(e) => log_error(
                manager.class_name(),
                "publish_configuration",
                &e.to_string(),
                Some(&identity),
            ),
        }
    }

    fn withdraw(&self) {
        let Some(handle) = self.state.lock().publication.take() else {
            return;
        };
        let Some(manager) = self.manager() else {
            return;
        };
        let context = manager.context();

        match context.configuration_host.withdraw(handle) {
            Ok(()) => {
                log_handler_operation(
                    "withdraw",
                    manager.class_name(),
                    Self::NAME,
                    "withdrawn",
                    None,
                );
                context.events.publish(
                    events::CONFIGURATION_WITHDRAWN,
                    json!({"component": manager.class_name(), "identity": self.identity()}),
                );
            }
            Err(e) => {
                debug!(
                    component = %manager.class_name(),
                    error = %e,
                    "Publication already withdrawn"
                )
            }
        }
    }

    /// Replace the previously propagated entries with `to_propagate` on every
    /// provided service.
    fn propagate(&self, manager: &ComponentManager, to_propagate: Dictionary) {
        let previous = self.state.lock().propagated.clone();
        if to_propagate.is_empty() && previous.is_empty() {
            return;
        }
        let Some(provided) = manager.handler::<ProvidedServiceHandler>() else {
            debug!(component = %manager.class_name(), "No provided services to propagate to");
            return;
        };

        info!(
            component = %manager.class_name(),
            keys = ?to_propagate.keys().collect::<Vec<_>>(),
            "Properties will be propagated"
        );
        if !previous.is_empty() {
            provided.remove_properties(&previous);
        }
        if !to_propagate.is_empty() {
            provided.add_properties(&to_propagate);
        }
        self.state.lock().propagated = to_propagate;
    }
}

impl ManagedConfiguration for ConfigurationHandler {
    fn updated(&self, configuration: Option<&Dictionary>) {
        let Some(manager) = self.manager() else {
            return;
        };
        let Some(configuration) = configuration else {
            warn!(
                component = %manager.class_name(),
                identity = %self.identity(),
                "The pushed configuration is null"
            );
            return;
        };

        let properties = self.properties();
        let mut to_propagate = Dictionary::new();

        for (key, incoming) in configuration {
            match properties.iter().find(|p| p.name() == key) {
                Some(property) => {
                    let value = property.coerce(incoming);
                    if property.value().as_ref() == Some(&value) {
                        continue;
                    }
                    match property.field() {
                        // The write path calls back into setter_callback
                        Some(field) => manager.setter_callback(field, value),
                        None => {
                            property.set_value(value);
                        }
                    }
                }
                None => {
                    info!(
                        component = %manager.class_name(),
                        property = %key,
                        "The property will be propagated to service registrations"
                    );
                    to_propagate.insert(key.clone(), incoming.clone());
                }
            }
        }

        self.propagate(&manager, to_propagate);
    }
}

impl Handler for ConfigurationHandler {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn configure(
        &self,
        manager: &Arc<ComponentManager>,
        metadata: &ComponentMetadata,
        configuration: &Dictionary,
    ) {
        *self.manager.write() = Arc::downgrade(manager);
        *self.state.lock() = ConfigurationState::default();

        let Some(declaration) = metadata.element().first(elements::PROPERTIES) else {
            return;
        };

        let configurable = declaration
            .attribute(attributes::CONFIGURABLE)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        for element in declaration.elements(elements::PROPERTY) {
            let field = element.attribute(attributes::FIELD);
            let Some(name) = element.attribute(attributes::NAME).or(field) else {
                error!(
                    component = %metadata.class_name(),
                    "A configurable property needs a name or a field"
                );
                continue;
            };

            let initial = resolve_initial_value(
                Some(name),
                field,
                element.attribute(attributes::VALUE),
                configuration,
            );
            let field_type = field.and_then(|f| metadata.field_type(f)).or_else(|| {
                configuration
                    .get(name)
                    .filter(|v| !is_textual(v))
                    .map(value::infer_type)
            });

            let property = Arc::new(ConfigurableProperty::new(
                name,
                field.map(str::to_string),
                initial,
                field_type,
            ));

            let rendered = property
                .value()
                .map(|v| value::render(&v))
                .unwrap_or_default();
            manager.update_component_info(|info| {
                info.add_property(PropertyInfo::new(
                    name,
                    Some(property.type_name().to_string()),
                    rendered,
                ))
            });

            self.add_property(property);
        }

        let identity = configuration
            .get(&manager.context().config.identity_key)
            .and_then(Value::as_str)
            .unwrap_or_else(|| metadata.class_name())
            .to_string();

        let properties = {
            let mut state = self.state.lock();
            state.identity = identity;
            state.configurable = configurable;
            state.properties.clone()
        };

        if properties.is_empty() {
            return;
        }

        // Already-typed entries bypass the textual defaults
        let mut fields = Vec::new();
        for property in &properties {
            let typed = configuration
                .get(property.name())
                .filter(|v| !is_textual(v))
                .or_else(|| {
                    property
                        .field()
                        .and_then(|f| configuration.get(f))
                        .filter(|v| !is_textual(v))
                });
            if let Some(value) = typed {
                property.set_value(value.clone());
            }
            if let Some(field) = property.field() {
                fields.push(field.to_string());
            }
        }

        if let Some(this) = self.this.upgrade() {
            manager.register_with_fields(this, &fields);
        }
        log_handler_operation(
            "configure",
            metadata.class_name(),
            Self::NAME,
            "registered",
            Some(&format!("{} properties", properties.len())),
        );
    }

    fn start(&self) {
        self.publish();
    }

    fn stop(&self) {
        self.withdraw();
    }

    fn state_changed(&self, state: ComponentState) {
        match state {
            ComponentState::Valid => {
                if !self.is_published() {
                    self.publish();
                }
            }
            ComponentState::Invalid => self.withdraw(),
        }
    }

    fn setter_callback(&self, field: &str, value: &Value) {
        for property in self.properties() {
            if property.field() == Some(field) && property.set_value(value.clone()) {
                debug!(
                    property = %property.name(),
                    field = %field,
                    "Configurable property updated"
                );
            }
        }
    }

    fn getter_callback(&self, field: &str, value: Option<Value>) -> Option<Value> {
        self.properties()
            .iter()
            .find(|p| p.field() == Some(field))
            .and_then(|p| p.value())
            .or(value)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

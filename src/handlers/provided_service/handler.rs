//! # Provided-Service Handler
//!
//! Keeps the services a component offers, and couples their registration to
//! the component's validity: services are registered on entering VALID and
//! unregistered on leaving it.
//!
//! Declared services are checked against the implementation metadata first.
//! A service naming a specification the implementation does not provide, or
//! a property backed by an unknown field, is dropped as a whole. A declared
//! property type that disagrees with the real field type is corrected.

use super::service::ProvidedService;
use crate::component::ComponentManager;
use crate::constants::{elements, events};
use crate::handlers::Handler;
use crate::logging::{log_error, log_registry_operation};
use crate::metadata::{ComponentMetadata, ProvidedServiceMetadata};
use crate::state_machine::ComponentState;
use crate::value::Dictionary;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::any::Any;
use std::sync::{Arc, Weak};
use tracing::{debug, error, warn};

/// Handler publishing the component's provided services
#[derive(Debug)]
pub struct ProvidedServiceHandler {
    this: Weak<ProvidedServiceHandler>,
    manager: RwLock<Weak<ComponentManager>>,
    services: RwLock<Vec<Arc<ProvidedService>>>,
}

impl ProvidedServiceHandler {
    pub const NAME: &'static str = "provided_service";

    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            manager: RwLock::new(Weak::new()),
            services: RwLock::new(Vec::new()),
        })
    }

    fn manager(&self) -> Option<Arc<ComponentManager>> {
        self.manager.read().upgrade()
    }

    pub fn provided_services(&self) -> Vec<Arc<ProvidedService>> {
        self.services.read().clone()
    }

    /// Check a declared service against the implementation metadata,
    /// reconciling property types on the way.
    ///
    /// Returns `false` when the service must be dropped.
    pub fn check_provided_service(
        service: &mut ProvidedServiceMetadata,
        metadata: &ComponentMetadata,
    ) -> bool {
        if service.specifications().is_empty() {
            error!(
                component = %metadata.class_name(),
                "The provided service declares no specification"
            );
            return false;
        }

        for specification in service.specifications() {
            if !metadata.implements(specification) {
                error!(
                    component = %metadata.class_name(),
                    specification = %specification,
                    "The provided service specification is not implemented"
                );
                return false;
            }
        }

        for property in service.properties_mut() {
            // A property without a field is a literal and always valid
            let Some(field) = property.field().map(str::to_string) else {
                continue;
            };
            let Some(real_type) = metadata.field_type(&field) else {
                error!(
                    component = %metadata.class_name(),
                    property = %property.name(),
                    field = %field,
                    "The property field does not exist in the implementation"
                );
                return false;
            };

            let declared = property.type_name().map(str::to_string);
            match declared.as_deref() {
                None => property.set_type(real_type),
                Some(declared) if declared != real_type => {
                    warn!(
                        component = %metadata.class_name(),
                        property = %property.name(),
                        declared = %declared,
                        real = %real_type,
                        "The property type does not match the field type, using the field type"
                    );
                    property.set_type(real_type);
                }
                Some(_) => {}
            }
        }

        true
    }

    /// Merge `properties` into every held service
    pub fn add_properties(&self, properties: &Dictionary) {
        let Some(manager) = self.manager() else {
            return;
        };
        let registry = &manager.context().registry;
        for service in self.provided_services() {
            if let Err(e) = service.add_properties(properties, registry.as_ref()) {
                log_error(manager.class_name(), "add_properties", &e.to_string(), None);
            }
        }
    }

    /// Remove `properties` (by key) from every held service
    pub fn remove_properties(&self, properties: &Dictionary) {
        let Some(manager) = self.manager() else {
            return;
        };
        let registry = &manager.context().registry;
        for service in self.provided_services() {
            if let Err(e) = service.remove_properties(properties, registry.as_ref()) {
                log_error(manager.class_name(), "remove_properties", &e.to_string(), None);
            }
        }
    }

    fn register_services(&self, manager: &ComponentManager) {
        let context = manager.context();
        for service in self.provided_services() {
            match service.register(context.registry.as_ref()) {
                Ok(true) => {
                    log_registry_operation(
                        "register",
                        manager.class_name(),
                        service.specifications(),
                        "registered",
                        None,
                    );
                    context.events.publish(
                        events::SERVICE_REGISTERED,
                        json!({
                            "component": manager.class_name(),
                            "specifications": service.specifications(),
                            "registration": service.registration().map(|h| h.to_string()),
                        }),
                    );
                }
                Ok(false) => {}
                Err(e) => log_error(
                    manager.class_name(),
                    "register_service",
                    &e.to_string(),
                    Some(&service.specifications().join(",")),
                ),
            }
        }
    }

    fn unregister_services(&self, manager: &ComponentManager) {
        let context = manager.context();
        for service in self.provided_services() {
            match service.unregister(context.registry.as_ref()) {
                Ok(true) => {
                    log_registry_operation(
                        "unregister",
                        manager.class_name(),
                        service.specifications(),
                        "unregistered",
                        None,
                    );
                    context.events.publish(
                        events::SERVICE_UNREGISTERED,
                        json!({
                            "component": manager.class_name(),
                            "specifications": service.specifications(),
                        }),
                    );
                }
                Ok(false) => {}
                Err(e) => log_error(
                    manager.class_name(),
                    "unregister_service",
                    &e.to_string(),
                    Some(&service.specifications().join(",")),
                ),
            }
        }
    }
}

impl Handler for ProvidedServiceHandler {
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
        self.services.write().clear();

        let mut services = Vec::new();
        for element in metadata.element().elements(elements::PROVIDES) {
            let mut declared =
                ProvidedServiceMetadata::from_element(element, metadata, configuration);
            if !Self::check_provided_service(&mut declared, metadata) {
                log_error(
                    metadata.class_name(),
                    "check_provided_service",
                    "provided service rejected",
                    Some(&declared.specifications().join(",")),
                );
                continue;
            }

            let service = Arc::new(ProvidedService::new(declared));
            service.apply_initial_configuration(configuration);

            manager.update_component_info(|info| {
                for specification in service.specifications() {
                    info.add_provided_service_specification(specification);
                }
                for property in service.describe() {
                    info.add_property(property);
                }
            });
            services.push(service);
        }

        if services.is_empty() {
            return;
        }

        let fields: Vec<String> = services
            .iter()
            .flat_map(|s| s.metadata().properties().iter())
            .filter_map(|p| p.field().map(str::to_string))
            .collect();
        debug!(
            component = %metadata.class_name(),
            services = services.len(),
            fields = ?fields,
            "Provided services configured"
        );
        *self.services.write() = services;

        if let Some(this) = self.this.upgrade() {
            manager.register_with_fields(this, &fields);
        }
    }

    fn start(&self) {
        let Some(manager) = self.manager() else {
            return;
        };
        if manager.state().is_valid() {
            self.register_services(&manager);
        }
    }

    fn stop(&self) {
        if let Some(manager) = self.manager() {
            self.unregister_services(&manager);
        }
    }

    fn state_changed(&self, state: ComponentState) {
        let Some(manager) = self.manager() else {
            return;
        };
        match state {
            ComponentState::Valid => self.register_services(&manager),
            ComponentState::Invalid => self.unregister_services(&manager),
        }
    }

    fn setter_callback(&self, field: &str, value: &Value) {
        let Some(manager) = self.manager() else {
            return;
        };
        let registry = &manager.context().registry;
        for service in self.provided_services().iter().filter(|s| s.has_field(field)) {
            if let Err(e) = service.set_field(field, value.clone(), registry.as_ref()) {
                log_error(manager.class_name(), "update_properties", &e.to_string(), Some(field));
            }
        }
    }

    fn getter_callback(&self, field: &str, value: Option<Value>) -> Option<Value> {
        self.provided_services()
            .iter()
            .find_map(|s| s.get_field(field))
            .or(value)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

use super::property::Property;
use crate::error::Result;
use crate::metadata::{FactoryPolicy, PropertyInfo, ProvidedServiceMetadata};
use crate::registry::{RegistrationHandle, ServiceRegistry};
use crate::value::{self, is_textual, Dictionary};
use parking_lot::Mutex;
use serde_json::Value;

#[derive(Debug)]
struct ServiceState {
    properties: Vec<Property>,
    /// Entries propagated from configuration updates
    extra: Dictionary,
    registration: Option<RegistrationHandle>,
    /// Bumped on every change of the visible properties
    revision: u64,
}

impl ServiceState {
    fn compose(&self) -> Dictionary {
        let mut properties: Dictionary = self
            .properties
            .iter()
            .filter_map(|p| p.get().map(|v| (p.name().to_string(), v.clone())))
            .collect();
        properties.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        properties
    }

    /// Properties to push in place, if the service is registered
    fn pending_update(&mut self) -> Option<PendingUpdate> {
        self.revision += 1;
        self.snapshot()
    }

    fn snapshot(&self) -> Option<PendingUpdate> {
        let handle = self.registration.clone()?;
        Some(PendingUpdate {
            handle,
            properties: self.compose(),
            revision: self.revision,
        })
    }
}

/// Visible properties captured at `revision`, to be pushed to `handle`
#[derive(Debug)]
struct PendingUpdate {
    handle: RegistrationHandle,
    properties: Dictionary,
    revision: u64,
}

/// Runtime counterpart of a declared provided service.
///
/// The registry is never called while the service state is locked. Writers
/// racing on the same service may push their snapshots in any order, so every
/// push is followed by a revision check that re-pushes newer state.
#[derive(Debug)]
pub struct ProvidedService {
    metadata: ProvidedServiceMetadata,
    state: Mutex<ServiceState>,
}

impl ProvidedService {
    pub fn new(metadata: ProvidedServiceMetadata) -> Self {
        let properties = metadata
            .properties()
            .iter()
            .cloned()
            .map(Property::new)
            .collect();
        Self {
            metadata,
            state: Mutex::new(ServiceState {
                properties,
                extra: Dictionary::new(),
                registration: None,
                revision: 0,
            }),
        }
    }

    pub fn metadata(&self) -> &ProvidedServiceMetadata {
        &self.metadata
    }

    pub fn specifications(&self) -> &[String] {
        self.metadata.specifications()
    }

    pub fn factory(&self) -> FactoryPolicy {
        self.metadata.factory()
    }

    pub fn is_registered(&self) -> bool {
        self.state.lock().registration.is_some()
    }

    pub fn registration(&self) -> Option<RegistrationHandle> {
        self.state.lock().registration.clone()
    }

    /// Properties attached to the registration: live property values, then
    /// propagated entries on top.
    pub fn service_properties(&self) -> Dictionary {
        self.state.lock().compose()
    }

    /// Description of the declared properties for the component surface
    pub fn describe(&self) -> Vec<PropertyInfo> {
        self.state
            .lock()
            .properties
            .iter()
            .map(|p| {
                PropertyInfo::new(
                    p.name(),
                    p.metadata().type_name().map(str::to_string),
                    p.get().map(value::render).unwrap_or_default(),
                )
            })
            .collect()
    }

    /// Apply already-typed configuration entries, matched by property name
    /// first and then by backing field.
    pub fn apply_initial_configuration(&self, configuration: &Dictionary) {
        let mut state = self.state.lock();
        for property in state.properties.iter_mut() {
            let typed = configuration
                .get(property.name())
                .filter(|v| !is_textual(v))
                .or_else(|| {
                    property
                        .field()
                        .and_then(|f| configuration.get(f))
                        .filter(|v| !is_textual(v))
                })
                .cloned();
            if let Some(value) = typed {
                property.set(value);
            }
        }
    }

    /// Whether a property is backed by `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.state
            .lock()
            .properties
            .iter()
            .any(|p| p.field() == Some(field))
    }

    pub fn get_field(&self, field: &str) -> Option<Value> {
        self.state
            .lock()
            .properties
            .iter()
            .find(|p| p.field() == Some(field))
            .and_then(|p| p.get().cloned())
    }

    /// Write the property backed by `field`; a registered service has its
    /// visible properties updated in place.
    pub fn set_field(
        &self,
        field: &str,
        value: Value,
        registry: &dyn ServiceRegistry,
    ) -> Result<bool> {
        let pending = {
            let mut state = self.state.lock();
            let Some(property) = state
                .properties
                .iter_mut()
                .find(|p| p.field() == Some(field))
            else {
                return Ok(false);
            };
            if !property.set(value) {
                return Ok(false);
            }
            state.pending_update()
        };

        self.push(pending, registry)?;
        Ok(true)
    }

    /// Merge propagated entries into the visible properties
    pub fn add_properties(
        &self,
        properties: &Dictionary,
        registry: &dyn ServiceRegistry,
    ) -> Result<()> {
        if properties.is_empty() {
            return Ok(());
        }
        let pending = {
            let mut state = self.state.lock();
            state
                .extra
                .extend(properties.iter().map(|(k, v)| (k.clone(), v.clone())));
            state.pending_update()
        };
        self.push(pending, registry)
    }

    /// Remove previously propagated entries; declared properties are untouched
    pub fn remove_properties(
        &self,
        properties: &Dictionary,
        registry: &dyn ServiceRegistry,
    ) -> Result<()> {
        let pending = {
            let mut state = self.state.lock();
            let before = state.extra.len();
            state.extra.retain(|k, _| !properties.contains_key(k));
            if state.extra.len() == before {
                return Ok(());
            }
            state.pending_update()
        };
        self.push(pending, registry)
    }

    /// Register with the registry unless already registered.
    ///
    /// Returns whether a new registration was made.
    pub fn register(&self, registry: &dyn ServiceRegistry) -> Result<bool> {
        let (properties, revision) = {
            let state = self.state.lock();
            if state.registration.is_some() {
                return Ok(false);
            }
            (state.compose(), state.revision)
        };

        let handle = registry.register(self.specifications(), &properties, self.factory())?;

        // Changes made while registering are pushed right away
        let pending = {
            let mut state = self.state.lock();
            state.registration = Some(handle);
            if state.revision != revision {
                state.snapshot()
            } else {
                None
            }
        };
        self.push(pending, registry)?;
        Ok(true)
    }

    /// Release the registration if there is one.
    ///
    /// Returns whether a registration was released.
    pub fn unregister(&self, registry: &dyn ServiceRegistry) -> Result<bool> {
        let Some(handle) = self.state.lock().registration.take() else {
            return Ok(false);
        };
        registry.unregister(handle)?;
        Ok(true)
    }

    /// Push `pending`, then keep pushing while a newer revision exists for the
    /// same registration.
    fn push(
        &self,
        mut pending: Option<PendingUpdate>,
        registry: &dyn ServiceRegistry,
    ) -> Result<()> {
        while let Some(update) = pending {
            let pushed = registry.update_properties(&update.handle, &update.properties);

            let state = self.state.lock();
            if state.registration.as_ref() != Some(&update.handle) {
                // Unregistered meanwhile; the next registration composes afresh
                return Ok(());
            }
            pushed?;
            pending = if state.revision != update.revision {
                state.snapshot()
            } else {
                None
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PropertyMetadata;
    use crate::registry::InMemoryServiceRegistry;
    use serde_json::json;
    use std::sync::{Arc, OnceLock};
    use std::thread;

    /// Registry writing to the service while its registration is in flight
    struct InterleavingRegistry {
        inner: InMemoryServiceRegistry,
        service: OnceLock<Arc<ProvidedService>>,
    }

    impl ServiceRegistry for InterleavingRegistry {
        fn register(
            &self,
            specifications: &[String],
            properties: &Dictionary,
            factory: FactoryPolicy,
        ) -> Result<RegistrationHandle> {
            let handle = self.inner.register(specifications, properties, factory)?;
            if let Some(service) = self.service.get() {
                service.set_field("m_level", json!(5), self)?;
            }
            Ok(handle)
        }

        fn unregister(&self, handle: RegistrationHandle) -> Result<()> {
            self.inner.unregister(handle)
        }

        fn update_properties(
            &self,
            handle: &RegistrationHandle,
            properties: &Dictionary,
        ) -> Result<()> {
            self.inner.update_properties(handle, properties)
        }
    }

    fn service() -> ProvidedService {
        let mut metadata =
            ProvidedServiceMetadata::new(vec!["Sensor".to_string()], FactoryPolicy::Singleton);
        let unit = Some("celsius".to_string());
        metadata.add_property(
            PropertyMetadata::new(Some("unit".to_string()), None, None, unit).unwrap(),
        );
        metadata.add_property(
            PropertyMetadata::new(
                Some("level".to_string()),
                Some("m_level".to_string()),
                Some("int".to_string()),
                None,
            )
            .unwrap(),
        );
        ProvidedService::new(metadata)
    }

    #[test]
    fn test_unset_properties_are_not_visible() {
        let service = service();
        let properties = service.service_properties();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties["unit"], json!("celsius"));
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = InMemoryServiceRegistry::new();
        let service = service();

        assert!(service.register(&registry).unwrap());
        assert!(!service.register(&registry).unwrap());
        assert_eq!(registry.lookup("Sensor").len(), 1);

        assert!(service.unregister(&registry).unwrap());
        assert!(!service.unregister(&registry).unwrap());
        assert!(registry.lookup("Sensor").is_empty());
    }

    #[test]
    fn test_field_write_updates_registration_in_place() {
        let registry = InMemoryServiceRegistry::new();
        let service = service();
        service.register(&registry).unwrap();
        let handle = service.registration().unwrap();

        assert!(service.set_field("m_level", json!(3), &registry).unwrap());
        assert!(!service.set_field("m_level", json!(3), &registry).unwrap());
        assert!(!service.set_field("m_unknown", json!(3), &registry).unwrap());

        let record = registry.registration(&handle).unwrap();
        assert_eq!(record.properties["level"], json!(3));
        assert_eq!(registry.stats().property_updates, 1);
        assert_eq!(service.get_field("m_level"), Some(json!(3)));
    }

    #[test]
    fn test_propagated_entries_override_and_are_removed_alone() {
        let registry = InMemoryServiceRegistry::new();
        let service = service();
        let mut extra = Dictionary::new();
        extra.insert("unit".to_string(), json!("kelvin"));
        extra.insert("mode".to_string(), json!("fast"));

        service.add_properties(&extra, &registry).unwrap();
        assert_eq!(service.service_properties()["unit"], json!("kelvin"));

        service.remove_properties(&extra, &registry).unwrap();
        let properties = service.service_properties();
        assert_eq!(properties["unit"], json!("celsius"));
        assert!(!properties.contains_key("mode"));
    }

    #[test]
    fn test_typed_initial_configuration() {
        let service = service();
        let mut configuration = Dictionary::new();
        configuration.insert("m_level".to_string(), json!(9));
        configuration.insert("unit".to_string(), json!("ignored textual"));
        service.apply_initial_configuration(&configuration);

        assert_eq!(service.get_field("m_level"), Some(json!(9)));
        assert_eq!(service.service_properties()["unit"], json!("celsius"));
    }

    #[test]
    fn test_describe_renders_values() {
        let infos = service().describe();
        assert_eq!(infos[0].value, "celsius");
        assert_eq!(infos[1].type_name.as_deref(), Some("int"));
        assert_eq!(infos[1].value, "");
    }

    #[test]
    fn test_write_during_registration_is_pushed() {
        let registry = InterleavingRegistry {
            inner: InMemoryServiceRegistry::new(),
            service: OnceLock::new(),
        };
        let service = Arc::new(service());
        registry.service.set(service.clone()).unwrap();

        assert!(service.register(&registry).unwrap());
        assert!(service.is_registered());

        let record = registry.inner.registration(&service.registration().unwrap()).unwrap();
        assert_eq!(record.properties["level"], json!(5));
        assert_eq!(record.properties, service.service_properties());
        assert_eq!(registry.inner.stats().property_updates, 1);
    }

    #[test]
    fn test_concurrent_writes_while_toggling_registration() {
        let registry = Arc::new(InMemoryServiceRegistry::new());
        let service = Arc::new(service());

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let registry = registry.clone();
                let service = service.clone();
                thread::spawn(move || {
                    for i in 0..200 {
                        let written = service.set_field("m_level", json!(t * 1000 + i), &*registry);
                        assert!(written.is_ok());
                    }
                })
            })
            .collect();

        for _ in 0..50 {
            service.register(&*registry).unwrap();
            service.unregister(&*registry).unwrap();
        }
        service.register(&*registry).unwrap();

        for writer in writers {
            writer.join().unwrap();
        }

        // the registry holds the last written state, however the pushes interleaved
        let record = registry.registration(&service.registration().unwrap()).unwrap();
        assert_eq!(record.properties, service.service_properties());

        service.set_field("m_level", json!(-1), &*registry).unwrap();
        let record = registry.registration(&service.registration().unwrap()).unwrap();
        assert_eq!(record.properties["level"], json!(-1));

        service.unregister(&*registry).unwrap();
        assert!(!service.is_registered());
        assert_eq!(registry.stats().live_registrations, 0);
        assert!(registry.lookup("Sensor").is_empty());
    }
}

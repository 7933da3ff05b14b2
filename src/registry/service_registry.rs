//! # Service Registry
//!
//! Publication surface for provided services.

use crate::error::{LifecycleError, Result};
use crate::metadata::FactoryPolicy;
use crate::value::Dictionary;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use uuid::Uuid;

/// Opaque handle on a published service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationHandle(Uuid);

impl RegistrationHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RegistrationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistrationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registration:{}", self.0)
    }
}

/// The operations the provided-service handler needs from a service registry
pub trait ServiceRegistry: Send + Sync {
    fn register(
        &self,
        specifications: &[String],
        properties: &Dictionary,
        factory: FactoryPolicy,
    ) -> Result<RegistrationHandle>;

    fn unregister(&self, handle: RegistrationHandle) -> Result<()>;

    /// Replace the properties of a live registration in place
    fn update_properties(&self, handle: &RegistrationHandle, properties: &Dictionary) -> Result<()>;
}

/// A service as currently visible in the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub handle: RegistrationHandle,
    pub specifications: Vec<String>,
    pub properties: Dictionary,
    pub factory: FactoryPolicy,
    pub registered_at: chrono::DateTime<chrono::Utc>,
}

/// Counters of registry traffic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub live_registrations: usize,
    pub registrations: u64,
    pub unregistrations: u64,
    pub property_updates: u64,
}

/// Thread-safe in-process service registry
#[derive(Debug, Default)]
pub struct InMemoryServiceRegistry {
    services: DashMap<RegistrationHandle, ServiceRecord>,
    registrations: AtomicU64,
    unregistrations: AtomicU64,
    property_updates: AtomicU64,
}

impl InMemoryServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every live registration offering `specification`
    pub fn lookup(&self, specification: &str) -> Vec<ServiceRecord> {
        self.services
            .iter()
            .filter(|entry| entry.specifications.iter().any(|s| s == specification))
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn registration(&self, handle: &RegistrationHandle) -> Option<ServiceRecord> {
        self.services.get(handle).map(|entry| entry.value().clone())
    }

    pub fn is_registered(&self, handle: &RegistrationHandle) -> bool {
        self.services.contains_key(handle)
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            live_registrations: self.services.len(),
            registrations: self.registrations.load(Ordering::Relaxed),
            unregistrations: self.unregistrations.load(Ordering::Relaxed),
            property_updates: self.property_updates.load(Ordering::Relaxed),
        }
    }
}

impl ServiceRegistry for InMemoryServiceRegistry {
    fn register(
        &self,
        specifications: &[String],
        properties: &Dictionary,
        factory: FactoryPolicy,
    ) -> Result<RegistrationHandle> {
        if specifications.is_empty() {
            return Err(LifecycleError::RegistryError(
                "cannot register a service without specifications".to_string(),
            ));
        }

        let handle = RegistrationHandle::new();
        self.services.insert(
            handle.clone(),
            ServiceRecord {
                handle: handle.clone(),
                specifications: specifications.to_vec(),
                properties: properties.clone(),
                factory,
                registered_at: chrono::Utc::now(),
            },
        );
        self.registrations.fetch_add(1, Ordering::Relaxed);

        debug!(%handle, ?specifications, "Service registered");
        Ok(handle)
    }

    fn unregister(&self, handle: RegistrationHandle) -> Result<()> {
        match self.services.remove(&handle) {
            Some(_) => {
                self.unregistrations.fetch_add(1, Ordering::Relaxed);
                debug!(%handle, "Service unregistered");
                Ok(())
            }
            None => Err(LifecycleError::UnknownHandle(handle.to_string())),
        }
    }

    fn update_properties(
        &self,
        handle: &RegistrationHandle,
        properties: &Dictionary,
    ) -> Result<()> {
        match self.services.get_mut(handle) {
            Some(mut record) => {
                record.properties = properties.clone();
                self.property_updates.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            None => Err(LifecycleError::UnknownHandle(handle.to_string())),
        }
    }
}

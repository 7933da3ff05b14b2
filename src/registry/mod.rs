//! # Registry Boundary
//!
//! The external collaborators a component talks to, and in-memory
//! implementations of them.
//!
//! ## Overview
//!
//! The engine never owns a service registry or a configuration admin. It only
//! needs a narrow surface from each:
//!
//! ```text
//! Registry Boundary
//! ├── ServiceRegistry     register / unregister / update_properties
//! └── ConfigurationHost   publish / withdraw a re-configuration endpoint
//! ```
//!
//! Both traits are synchronous and may block; callers must not hold their own
//! locks while invoking them.
//!
//! ## Usage
//!
//! ```rust
//! use lifecycle_core::metadata::FactoryPolicy;
//! use lifecycle_core::registry::{InMemoryServiceRegistry, ServiceRegistry};
//! use lifecycle_core::value::Dictionary;
//!
//! let registry = InMemoryServiceRegistry::new();
//! let handle = registry
//!     .register(&["Sensor".to_string()], &Dictionary::new(), FactoryPolicy::Singleton)
//!     .unwrap();
//! assert_eq!(registry.lookup("Sensor").len(), 1);
//! registry.unregister(handle).unwrap();
//! ```

pub mod configuration_host;
pub mod service_registry;

// Re-export main types for easy access
pub use configuration_host::{
    ConfigurationHost, InMemoryConfigurationHost, ManagedConfiguration, PublicationHandle,
};
pub use service_registry::{
    InMemoryServiceRegistry, RegistrationHandle, RegistryStats, ServiceRecord, ServiceRegistry,
};

#![allow(clippy::doc_markdown)] // Allow technical terms in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Lifecycle Core
//!
//! Handler-based lifecycle and configuration-propagation engine for dynamic
//! components.
//!
//! ## Overview
//!
//! A component instance is driven by a [`ComponentManager`] that owns its
//! validity state (VALID / INVALID) and intercepts every read and write of its
//! manipulated fields. Independent handlers plug into that lifecycle:
//!
//! - **Provided services** are validated against the implementation metadata
//!   and registered with the service registry only while the instance is VALID
//! - **Configuration** is injected into fields, kept in sync both ways, and
//!   optionally re-delivered live through a configuration host; entries that
//!   match no declared property are propagated onto the provided services
//! - **Lifecycle callbacks** call component methods on declared transitions
//!
//! ## Module Organization
//!
//! - [`metadata`] - Immutable component descriptors
//! - [`component`] - Component manager, method table and platform context
//! - [`handlers`] - The handler trait and the standard handlers
//! - [`registry`] - Service registry and configuration host boundaries
//! - [`state_machine`] - Validity states and transitions
//! - [`value`] - Configuration dictionaries and value conversion
//! - [`config`] - Engine configuration
//! - [`error`] - Structured error handling
//! - [`events`] - Lifecycle event broadcasting
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use lifecycle_core::component::{ComponentManager, ComponentType, PlatformContext};
//! use lifecycle_core::handlers::default_handlers;
//! use lifecycle_core::metadata::{ComponentMetadata, Element};
//! use lifecycle_core::registry::{InMemoryConfigurationHost, InMemoryServiceRegistry};
//! use lifecycle_core::value::Dictionary;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(InMemoryServiceRegistry::new());
//! let host = Arc::new(InMemoryConfigurationHost::new());
//! let context = PlatformContext::new(registry.clone(), host);
//!
//! let metadata = ComponentMetadata::builder("com.acme.SensorImpl")
//!     .interface("Sensor")
//!     .element(Element::new("Provides"))
//!     .build();
//! let component_type = ComponentType::new("com.acme.SensorImpl");
//! let manager = ComponentManager::new(metadata, component_type, context);
//!
//! manager.configure(default_handlers(), &Dictionary::new());
//! manager.start();
//! assert_eq!(registry.lookup("Sensor").len(), 1);
//!
//! manager.stop();
//! assert!(registry.lookup("Sensor").is_empty());
//! ```

pub mod component;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod metadata;
pub mod registry;
pub mod state_machine;
pub mod value;

pub use component::{ComponentManager, ComponentType, PlatformContext};
pub use config::EngineConfig;
pub use error::{CallbackError, LifecycleError, Result};
pub use events::{EventPublisher, PublishedEvent};
pub use handlers::{
    default_handlers, ConfigurationHandler, Handler, LifecycleCallbackHandler,
    ProvidedServiceHandler,
};
pub use metadata::{ComponentInfo, ComponentMetadata, Element};
pub use registry::{
    ConfigurationHost, InMemoryConfigurationHost, InMemoryServiceRegistry, ServiceRegistry,
};
pub use state_machine::ComponentState;
pub use value::Dictionary;

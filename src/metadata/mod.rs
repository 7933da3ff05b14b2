//! # Component Metadata
//!
//! Immutable descriptors produced by an external front-end (XML, annotations,
//! JSON) and consumed by the handlers during `configure`.
//!
//! ```text
//! Element tree ──► ComponentMetadata ──► handler-specific descriptors
//!                   (class name,          PropertyMetadata
//!                    manipulated fields,  ProvidedServiceMetadata
//!                    interfaces)          LifecycleCallbackMetadata
//! ```
//!
//! [`ComponentInfo`] is the opposite direction: the capability surface the
//! handlers publish about the component for external introspection.

pub mod callback;
pub mod component;
pub mod element;
pub mod info;
pub mod property;
pub mod provided_service;

pub use callback::LifecycleCallbackMetadata;
pub use component::{ComponentMetadata, ComponentMetadataBuilder};
pub use element::Element;
pub use info::{ComponentInfo, PropertyInfo};
pub use property::{resolve_initial_value, PropertyMetadata};
pub use provided_service::{FactoryPolicy, ProvidedServiceMetadata};

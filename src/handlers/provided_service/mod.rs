//! # Provided Services
//!
//! Publication of the services a component offers. Declared services are
//! validated against the implementation metadata during `configure` and are
//! registered only while the component is VALID.

pub mod handler;
pub mod property;
pub mod service;

pub use handler::ProvidedServiceHandler;
pub use property::Property;
pub use service::ProvidedService;

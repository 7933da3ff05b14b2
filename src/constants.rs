//! # Engine Constants
//!
//! Element and attribute names understood in component descriptor trees,
//! well-known property keys and the lifecycle event names published by the
//! component manager.

// Re-export state type for convenience
pub use crate::state_machine::ComponentState;

/// Element names in a component descriptor tree
pub mod elements {
    pub const PROPERTIES: &str = "Properties";
    pub const PROPERTY: &str = "Property";
    pub const PROVIDES: &str = "Provides";
    pub const CALLBACK: &str = "callback";
    pub const MANIPULATION: &str = "Manipulation";
    pub const INTERFACE: &str = "Interface";
    pub const FIELD: &str = "Field";
}

/// Attribute names in a component descriptor tree
pub mod attributes {
    pub const CLASS_NAME: &str = "className";
    pub const NAME: &str = "name";
    pub const FIELD: &str = "field";
    pub const VALUE: &str = "value";
    pub const TYPE: &str = "type";
    pub const INTERFACE: &str = "interface";
    pub const FACTORY: &str = "factory";
    pub const CONFIGURABLE: &str = "configurable";
    pub const INITIAL: &str = "initial";
    pub const FINAL: &str = "final";
    pub const METHOD: &str = "method";
    pub const IS_STATIC: &str = "isStatic";
}

/// Lifecycle events published by the component manager and its handlers
pub mod events {
    pub const COMPONENT_STATE_CHANGED: &str = "component.state_changed";
    pub const SERVICE_REGISTERED: &str = "service.registered";
    pub const SERVICE_UNREGISTERED: &str = "service.unregistered";
    pub const CONFIGURATION_PUBLISHED: &str = "configuration.published";
    pub const CONFIGURATION_WITHDRAWN: &str = "configuration.withdrawn";
}

/// Engine-wide defaults
pub mod system {
    /// Specification under which a re-configurable component is published
    pub const MANAGED_SERVICE_SPECIFICATION: &str = "org.osgi.service.cm.ManagedService";

    /// Property key listing the specifications an endpoint is published under
    pub const OBJECT_CLASS: &str = "objectClass";

    /// Property key carrying a configuration endpoint's identity
    pub const SERVICE_PID: &str = "service.pid";

    /// Configuration key that overrides the component identity
    pub const IDENTITY_KEY: &str = "name";

    /// `factory` attribute value selecting one instance per consumer
    pub const SERVICE_FACTORY: &str = "service";

    /// Default lifecycle event channel capacity
    pub const EVENT_CHANNEL_CAPACITY: usize = 256;

    /// Version compatibility marker
    pub const LIFECYCLE_CORE_VERSION: &str = "0.1.0";
}

pub mod configurable_property;
pub mod handler;

pub use configurable_property::ConfigurableProperty;
pub use handler::ConfigurationHandler;

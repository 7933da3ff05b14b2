use crate::constants::system;
use crate::error::{LifecycleError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine-level settings shared by every component manager of a platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Specification a re-configurable component publishes its endpoint under
    pub managed_service_specification: String,
    /// Property key carrying the endpoint identity
    pub pid_property: String,
    /// Configuration key overriding the component identity
    pub identity_key: String,
    pub event_channel_capacity: usize,
    pub log_level: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            managed_service_specification: system::MANAGED_SERVICE_SPECIFICATION.to_string(),
            pid_property: system::SERVICE_PID.to_string(),
            identity_key: system::IDENTITY_KEY.to_string(),
            event_channel_capacity: system::EVENT_CHANNEL_CAPACITY,
            log_level: None,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `LIFECYCLE_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(spec) = std::env::var("LIFECYCLE_MANAGED_SERVICE_SPECIFICATION") {
            config.managed_service_specification = spec;
        }

        if let Ok(pid_property) = std::env::var("LIFECYCLE_PID_PROPERTY") {
            config.pid_property = pid_property;
        }

        if let Ok(identity_key) = std::env::var("LIFECYCLE_IDENTITY_KEY") {
            config.identity_key = identity_key;
        }

        if let Ok(capacity) = std::env::var("LIFECYCLE_EVENT_CHANNEL_CAPACITY") {
            config.event_channel_capacity = capacity.parse().map_err(|e| {
                LifecycleError::ConfigurationError(format!("Invalid event_channel_capacity: {e}"))
            })?;
        }

        if let Ok(level) = std::env::var("LIFECYCLE_LOG_LEVEL") {
            config.log_level = Some(level);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from an optional file (any format the `config` crate recognises by
    /// extension), overridden by `LIFECYCLE_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: EngineConfig = builder
            .add_source(config::Environment::with_prefix("LIFECYCLE"))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.managed_service_specification.trim().is_empty() {
            return Err(LifecycleError::ConfigurationError(
                "managed_service_specification must not be empty".to_string(),
            ));
        }
        if self.pid_property.trim().is_empty() {
            return Err(LifecycleError::ConfigurationError(
                "pid_property must not be empty".to_string(),
            ));
        }
        if self.identity_key.trim().is_empty() {
            return Err(LifecycleError::ConfigurationError(
                "identity_key must not be empty".to_string(),
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(LifecycleError::ConfigurationError(
                "event_channel_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pid_property, "service.pid");
        assert_eq!(config.identity_key, "name");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = EngineConfig {
            event_channel_capacity: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LifecycleError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"pid_property": "component.pid", "event_channel_capacity": 16}}"#
        )
        .unwrap();

        let config = EngineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.pid_property, "component.pid");
        assert_eq!(config.event_channel_capacity, 16);
        assert_eq!(
            config.managed_service_specification,
            system::MANAGED_SERVICE_SPECIFICATION
        );
    }

    #[test]
    fn test_from_env_overrides_defaults() {
        // only this test touches the identity key variable
        std::env::set_var("LIFECYCLE_IDENTITY_KEY", "instance.name");
        let config = EngineConfig::from_env();
        std::env::remove_var("LIFECYCLE_IDENTITY_KEY");

        let config = config.unwrap();
        assert_eq!(config.identity_key, "instance.name");
        assert_eq!(config.pid_property, system::SERVICE_PID);
    }
}

use thiserror::Error;

/// Errors raised at the engine's external boundaries.
///
/// Handlers never return these to the component manager: every detected
/// inconsistency is logged and degrades the component's capabilities instead.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Metadata error: {0}")]
    MetadataError(String),

    #[error("Registry error: {0}")]
    RegistryError(String),

    #[error("Unknown registration handle: {0}")]
    UnknownHandle(String),

    #[error("Value conversion error: cannot convert '{value}' to {target_type}")]
    ConversionError { value: String, target_type: String },

    #[error("Callback error: {0}")]
    CallbackError(#[from] CallbackError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a single lifecycle callback invocation.
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("callback method '{method}' is not found")]
    NotFound { method: String },

    #[error("callback method '{method}' is not accessible")]
    Inaccessible { method: String },

    #[error("callback method '{method}' failed: {cause}")]
    Failed {
        method: String,
        #[source]
        cause: anyhow::Error,
    },
}

impl CallbackError {
    pub fn method(&self) -> &str {
        match self {
            Self::NotFound { method }
            | Self::Inaccessible { method }
            | Self::Failed { method, .. } => {
                method
            }
        }
    }
}

impl From<config::ConfigError> for LifecycleError {
    fn from(err: config::ConfigError) -> Self {
        LifecycleError::ConfigurationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;

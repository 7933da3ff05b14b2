//! # Structured Logging Module
//!
//! Environment-aware structured logging for component lifecycle, handler and
//! registry operations.

use crate::config::EngineConfig;
use crate::constants::system;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    init(None);
}

/// Initialize structured logging, preferring the engine's configured level
pub fn init_structured_logging_with(config: &EngineConfig) {
    init(config.log_level.as_deref());
}

fn init(level_override: Option<&str>) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = match level_override {
            Some(level) => level.to_string(),
            None => std::env::var("RUST_LOG")
                .or_else(|_| std::env::var("LIFECYCLE_LOG_LEVEL"))
                .unwrap_or_else(|_| get_log_level(&environment)),
        };

        let json_output = environment == "production";

        let console = if json_output {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(EnvFilter::new(log_level.clone()))
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(EnvFilter::new(log_level.clone()))
                .boxed()
        };

        // Use try_init to avoid panic if global subscriber already set
        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized, keeping it"
            );
        }

        tracing::info!(
            pid = std::process::id(),
            version = system::LIFECYCLE_CORE_VERSION,
            environment = %environment,
            log_level = %log_level,
            "STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("LIFECYCLE_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for handler operations
pub fn log_handler_operation(
    operation: &str,
    component: &str,
    handler: &str,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        component = %component,
        handler = %handler,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "HANDLER_OPERATION"
    );
}

/// Log structured data for service registry and configuration host operations
pub fn log_registry_operation(
    operation: &str,
    component: &str,
    specifications: &[String],
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        component = %component,
        specifications = ?specifications,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "REGISTRY_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_structured_logging();
        init_structured_logging_with(&EngineConfig::default());
        log_handler_operation("configure", "Example", "test", "ok", None);
    }
}

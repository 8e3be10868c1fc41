//! Configuration validation utilities.

use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse YAML configuration.
    #[error("failed to parse YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Validate a metrics endpoint path.
///
/// The path must be absolute and must not be the bare root, so the scrape
/// route never collides with the health probe.
pub fn validate_metrics_path(path: &str) -> Result<(), String> {
    if !path.starts_with('/') {
        return Err(format!("metrics path '{path}' must start with '/'"));
    }
    if path == "/" {
        return Err("metrics path must not be '/'".to_string());
    }
    Ok(())
}

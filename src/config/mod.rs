//! Configuration module for the exporter.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Scrape endpoint settings (bind address, port, metrics path, TLS config)
//! - pgBackRest invocation settings (config paths, stanza lists, verbosity)

mod app;
mod validation;

pub use app::{AppConfig, BackrestConfig, ExporterConfig};
pub use validation::ConfigError;

// Re-export constants
pub use app::{DEFAULT_METRICS_PATH, DEFAULT_PORT};

//! Application configuration structures.

use std::net::IpAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::validation::{ConfigError, validate_metrics_path};

// =============================================================================
// Constants
// =============================================================================

/// Default scrape listen port.
pub const DEFAULT_PORT: u16 = 9854;

/// Default metrics endpoint path.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

// =============================================================================
// Exporter Configuration
// =============================================================================

/// Scrape endpoint configuration.
///
/// Constructed once before the server starts and read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Listen bind address (default: "0.0.0.0").
    pub bind: String,

    /// Listen port (default: 9854).
    pub port: u16,

    /// Metrics endpoint path (default: "/metrics").
    pub path: String,

    /// Optional TLS configuration file for the scrape listener.
    pub tls_config_path: Option<String>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_METRICS_PATH.to_string(),
            tls_config_path: None,
        }
    }
}

// =============================================================================
// pgBackRest Configuration
// =============================================================================

/// Settings for the pgBackRest invocation, the source of every
/// collection cycle's request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackrestConfig {
    /// pgBackRest configuration file, passed as `--config`.
    pub config: Option<String>,

    /// pgBackRest configuration include directory, passed as
    /// `--config-include-path`.
    pub config_include_path: Option<String>,

    /// Stanzas to collect. Empty means every stanza the tool reports.
    pub stanzas_include: Vec<String>,

    /// Stanzas to skip.
    pub stanzas_exclude: Vec<String>,

    /// Publish WAL min/max labels on archive metrics.
    pub verbose_wal: bool,
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scrape endpoint configuration.
    pub exporter: ExporterConfig,

    /// pgBackRest invocation configuration.
    pub backrest: BackrestConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// A stanza name appearing on both the include and exclude list is NOT
    /// rejected here; the collection pipeline handles that conflict per
    /// cycle so the remaining stanzas keep collecting.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.exporter.bind.parse::<IpAddr>().map_err(|_| {
            ConfigError::ValidationError(format!(
                "invalid listen bind address: '{}'",
                self.exporter.bind
            ))
        })?;

        if self.exporter.port == 0 {
            return Err(ConfigError::ValidationError(
                "listen port must be non-zero".to_string(),
            ));
        }

        validate_metrics_path(&self.exporter.path).map_err(ConfigError::ValidationError)?;

        if let Some(ref tls_path) = self.exporter.tls_config_path {
            if !Path::new(tls_path).is_file() {
                return Err(ConfigError::ValidationError(format!(
                    "TLS config file not found: '{tls_path}'"
                )));
            }
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
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.exporter.port, DEFAULT_PORT);
        assert_eq!(config.exporter.path, DEFAULT_METRICS_PATH);
        assert!(config.backrest.stanzas_include.is_empty());
        assert!(!config.backrest.verbose_wal);
    }

    #[test]
    fn test_load_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "exporter:\n  bind: 127.0.0.1\n  port: 9855\n  path: /pgbackrest\nbackrest:\n  config: /etc/pgbackrest.conf\n  stanzas_include: [demo]\n  stanzas_exclude: [noisy]\n  verbose_wal: true\n"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.exporter.bind, "127.0.0.1");
        assert_eq!(config.exporter.port, 9855);
        assert_eq!(config.exporter.path, "/pgbackrest");
        assert_eq!(config.backrest.config.as_deref(), Some("/etc/pgbackrest.conf"));
        assert_eq!(config.backrest.stanzas_include, vec!["demo".to_string()]);
        assert_eq!(config.backrest.stanzas_exclude, vec!["noisy".to_string()]);
        assert!(config.backrest.verbose_wal);
    }

    #[test]
    fn test_validate_rejects_bad_bind() {
        let mut config = AppConfig::default();
        config.exporter.bind = "not-an-address".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = AppConfig::default();
        config.exporter.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_relative_metrics_path() {
        let mut config = AppConfig::default();
        config.exporter.path = "metrics".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_tls_file() {
        let mut config = AppConfig::default();
        config.exporter.tls_config_path = Some("/nonexistent/web-tls.yml".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_existing_tls_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut config = AppConfig::default();
        config.exporter.tls_config_path = Some(file.path().display().to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_conflicting_stanza_lists_are_not_a_load_error() {
        let mut config = AppConfig::default();
        config.backrest.stanzas_include = vec!["demo".to_string()];
        config.backrest.stanzas_exclude = vec!["demo".to_string()];
        assert!(config.validate().is_ok());
    }
}

//! # Configuration
//!
//! Layered configuration for the publisher cache: built-in defaults, then an
//! optional TOML/YAML/JSON file, then `BUSCACHE_*` environment variables
//! (nested keys separated by `__`, e.g. `BUSCACHE_TRANSPORT__TRANSPORT_TYPE`).

use crate::error::{BusError, BusResult};
use crate::transport::TransportConfig;
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_PREFIX: &str = "BUSCACHE";

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherCacheConfig {
    /// Deployment environment; drives the default log level
    pub environment: String,
    /// Explicit tracing filter, overriding the environment default
    pub log_level: Option<String>,
    pub log_format: LogFormat,
    /// Options applied to every connection the cache opens
    pub transport: TransportConfig,
}

impl Default for PublisherCacheConfig {
    fn default() -> Self {
        Self {
            environment: detect_environment(),
            log_level: None,
            log_format: LogFormat::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl PublisherCacheConfig {
    /// Defaults overlaid with `BUSCACHE_*` environment variables
    pub fn from_env() -> BusResult<Self> {
        Self::build(None, ENV_PREFIX)
    }

    /// Defaults overlaid with `path`, then with `BUSCACHE_*` environment variables
    pub fn load(path: &Path) -> BusResult<Self> {
        Self::build(Some(path), ENV_PREFIX)
    }

    pub(crate) fn build(path: Option<&Path>, env_prefix: &str) -> BusResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> BusResult<()> {
        if self.environment.trim().is_empty() {
            return Err(BusError::configuration(
                "environment",
                "environment must not be empty",
            ));
        }
        if let Some(identifier) = &self.transport.client_identifier {
            if identifier.trim().is_empty() {
                return Err(BusError::configuration(
                    "transport",
                    "client_identifier must not be blank when set",
                ));
            }
        }
        Ok(())
    }
}

/// Current environment from environment variables
pub fn detect_environment() -> String {
    std::env::var("BUSCACHE_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportType;
    use std::io::Write;

    #[test]
    fn test_defaults_use_reliable_stream_transport() {
        let config = PublisherCacheConfig::build(None, "BUSCACHE_TEST_DEFAULTS").unwrap();
        assert_eq!(config.transport.transport_type, TransportType::AmqpTcp);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
environment = "staging"
log_format = "json"

[transport]
transport_type = "amqp_web_sockets"
client_identifier = "billing-api"
"#
        )
        .unwrap();

        let config =
            PublisherCacheConfig::build(Some(file.path()), "BUSCACHE_TEST_FILE").unwrap();
        assert_eq!(config.environment, "staging");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.transport.transport_type,
            TransportType::AmqpWebSockets
        );
        assert_eq!(
            config.transport.client_identifier.as_deref(),
            Some("billing-api")
        );
    }

    #[test]
    fn test_environment_variables_override_file() {
        std::env::set_var("BUSCACHE_TEST_ENV_ENVIRONMENT", "production");
        std::env::set_var("BUSCACHE_TEST_ENV_LOG_LEVEL", "warn");

        let config = PublisherCacheConfig::build(None, "BUSCACHE_TEST_ENV").unwrap();

        std::env::remove_var("BUSCACHE_TEST_ENV_ENVIRONMENT");
        std::env::remove_var("BUSCACHE_TEST_ENV_LOG_LEVEL");

        assert_eq!(config.environment, "production");
        assert_eq!(config.log_level.as_deref(), Some("warn"));
    }

    #[test]
    fn test_missing_file_is_a_configuration_error() {
        let err = PublisherCacheConfig::build(
            Some(Path::new("/nonexistent/buscache.toml")),
            "BUSCACHE_TEST_MISSING",
        )
        .unwrap_err();
        assert!(matches!(err, BusError::Configuration { .. }));
    }

    #[test]
    fn test_blank_client_identifier_is_rejected() {
        let config = PublisherCacheConfig {
            transport: TransportConfig::default().with_client_identifier("  "),
            ..PublisherCacheConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

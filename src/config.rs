//! Configuration management for the churn prediction service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "127.0.0.1:5000"
    pub address: String,
    /// Map error kinds to 4xx/5xx instead of always answering 200
    pub strict_status_codes: bool,
}

/// ONNX model artifacts
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Ensemble classifier, queried for the predicted label
    pub ensemble_path: String,
    /// First constituent estimator, queried for the churn probability
    pub member_path: String,
    /// Number of intra-op threads per ONNX session
    pub onnx_threads: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

/// Metrics reporting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Seconds between periodic summaries; 0 disables the reporter
    pub report_interval_secs: u64,
}

impl AppConfig {
    /// Load configuration from the default path, falling back to built-in defaults
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path.
    ///
    /// The file is optional; any key it omits keeps its default value.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let defaults = Self::default();

        let config = Config::builder()
            .set_default("server.address", defaults.server.address)?
            .set_default("server.strict_status_codes", defaults.server.strict_status_codes)?
            .set_default("models.ensemble_path", defaults.models.ensemble_path)?
            .set_default("models.member_path", defaults.models.member_path)?
            .set_default("models.onnx_threads", defaults.models.onnx_threads as u64)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .set_default(
                "metrics.report_interval_secs",
                defaults.metrics.report_interval_secs,
            )?
            .add_source(File::from(path.as_ref()).required(false))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                address: "127.0.0.1:5000".to_string(),
                strict_status_codes: false,
            },
            models: ModelsConfig {
                ensemble_path: "models/churn_ensemble.onnx".to_string(),
                member_path: "models/churn_estimator_0.onnx".to_string(),
                onnx_threads: 1,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
            metrics: MetricsConfig {
                report_interval_secs: 60,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.address, "127.0.0.1:5000");
        assert!(!config.server.strict_status_codes);
        assert_eq!(config.models.onnx_threads, 1);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from_path(dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.models.ensemble_path, "models/churn_ensemble.onnx");
        assert_eq!(config.models.member_path, "models/churn_estimator_0.onnx");
        assert_eq!(config.metrics.report_interval_secs, 60);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\naddress = \"0.0.0.0:8080\"\nstrict_status_codes = true\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();

        assert_eq!(config.server.address, "0.0.0.0:8080");
        assert!(config.server.strict_status_codes);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.models.onnx_threads, 1);
    }
}

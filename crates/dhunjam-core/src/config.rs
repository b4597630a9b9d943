//! Configuration management for the venue admin console

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::{Validate, ValidationError};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Backend API configuration
    #[validate(nested)]
    pub api: ApiConfig,

    /// Session persistence configuration
    pub session: SessionConfig,

    /// Chart output configuration
    pub chart: ChartConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiConfig {
    /// Base URL of the DhunJam backend
    #[serde(default = "default_base_url")]
    #[validate(url, custom(function = "validate_http_scheme"))]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    #[validate(range(min = 1))]
    pub timeout_seconds: u64,
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File the session token and admin id are kept in
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

/// Chart output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// HTML file the pricing chart is written to
    #[serde(default = "default_chart_output")]
    pub output: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "https://stg.dhunjam.in".to_string()
}

const fn default_timeout_seconds() -> u64 {
    30
}

fn default_session_path() -> PathBuf {
    directories::ProjectDirs::from("in", "dhunjam", "dhunjam-admin").map_or_else(
        || PathBuf::from("session.json"),
        |dirs| dirs.data_dir().join("session.json"),
    )
}

fn default_chart_output() -> PathBuf {
    PathBuf::from("pricing-chart.html")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn validate_http_scheme(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::new("http_scheme"))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output: default_chart_output(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// `DHUNJAM_` variables, `__` between section and key
fn environment() -> config::Environment {
    config::Environment::with_prefix("DHUNJAM")
        .prefix_separator("_")
        .separator("__")
}

impl Config {
    /// Load configuration from an optional file and `DHUNJAM_` environment variables
    ///
    /// Without an explicit path, `dhunjam.toml` in the working directory is
    /// read when present. Nested keys use a double underscore, e.g.
    /// `DHUNJAM_API__BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        Self::load_from(path, environment())
    }

    fn load_from(path: Option<&Path>, environment: config::Environment) -> crate::Result<Self> {
        let file = path.map_or_else(
            || config::File::with_name("dhunjam").required(false),
            |path| config::File::from(path).required(true),
        );

        let config: Self = config::Config::builder()
            .add_source(file)
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }
}

//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the fixture fetcher, supporting TOML files and
//! environment variable overrides with validation and type-safe access to all
//! settings.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Range checks for worker and retry bounds, delay sanity checks
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables
//! 2. Configuration files
//! 3. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use sports_fixture_fetcher::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_file("config.toml")?;
//! println!("workers: {}", config.fetch.max_workers);
//! # Ok(())
//! # }
//! ```

use crate::errors::{FetchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fixtures API settings
    pub api: ApiConfig,
    /// Fetch, cache, and retry settings
    pub fetch: FetchConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Fixtures API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// School identifier passed as the `ID` query parameter
    pub school_id: String,
    /// API key passed as the `key` query parameter
    pub api_key: String,
    /// API endpoint base URL
    pub base_url: String,
    /// Per-attempt request timeout in seconds
    pub request_timeout_seconds: u64,
}

/// Fetch pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Directory holding cached responses and the consolidated output
    pub cache_dir: PathBuf,
    /// File name of the consolidated XML document, relative to `cache_dir`
    pub output_file: String,
    /// Maximum number of concurrent fetch workers (1-10)
    pub max_workers: usize,
    /// Number of attempts for failed requests (1-5)
    pub retry_attempts: u32,
    /// Base delay for exponential backoff, in seconds
    pub retry_base_delay_seconds: f64,
    /// Rate-limiting delay before each network request, in seconds
    pub delay_between_requests: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log file path (optional, logs to stdout if not specified)
    pub file_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| FetchError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| FetchError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(school_id) = std::env::var("FIXTURE_FETCHER_SCHOOL_ID") {
            self.api.school_id = school_id;
        }
        if let Ok(api_key) = std::env::var("FIXTURE_FETCHER_API_KEY") {
            self.api.api_key = api_key;
        }
        if let Ok(base_url) = std::env::var("FIXTURE_FETCHER_BASE_URL") {
            self.api.base_url = base_url;
        }
        if let Ok(cache_dir) = std::env::var("FIXTURE_FETCHER_CACHE_DIR") {
            self.fetch.cache_dir = PathBuf::from(cache_dir);
        }
        if let Ok(workers) = std::env::var("FIXTURE_FETCHER_MAX_WORKERS") {
            self.fetch.max_workers = workers.parse().map_err(|_| FetchError::Config {
                message: "Invalid worker count in FIXTURE_FETCHER_MAX_WORKERS".to_string(),
            })?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api.school_id.is_empty() {
            return Err(FetchError::ValidationFailed {
                field: "api.school_id".to_string(),
                reason: "School ID cannot be empty".to_string(),
            });
        }

        if self.api.base_url.is_empty() {
            return Err(FetchError::ValidationFailed {
                field: "api.base_url".to_string(),
                reason: "Base URL cannot be empty".to_string(),
            });
        }

        if self.api.request_timeout_seconds == 0 {
            return Err(FetchError::ValidationFailed {
                field: "api.request_timeout_seconds".to_string(),
                reason: "Request timeout cannot be zero".to_string(),
            });
        }

        if !(1..=10).contains(&self.fetch.max_workers) {
            return Err(FetchError::ValidationFailed {
                field: "fetch.max_workers".to_string(),
                reason: format!(
                    "Worker count must be between 1 and 10, got {}",
                    self.fetch.max_workers
                ),
            });
        }

        if !(1..=5).contains(&self.fetch.retry_attempts) {
            return Err(FetchError::ValidationFailed {
                field: "fetch.retry_attempts".to_string(),
                reason: format!(
                    "Retry attempts must be between 1 and 5, got {}",
                    self.fetch.retry_attempts
                ),
            });
        }

        if !self.fetch.retry_base_delay_seconds.is_finite()
            || self.fetch.retry_base_delay_seconds < 0.0
        {
            return Err(FetchError::ValidationFailed {
                field: "fetch.retry_base_delay_seconds".to_string(),
                reason: "Retry base delay must be a non-negative number".to_string(),
            });
        }

        if !self.fetch.delay_between_requests.is_finite() || self.fetch.delay_between_requests < 0.0
        {
            return Err(FetchError::ValidationFailed {
                field: "fetch.delay_between_requests".to_string(),
                reason: "Request delay must be a non-negative number".to_string(),
            });
        }

        if self.fetch.output_file.is_empty() {
            return Err(FetchError::ValidationFailed {
                field: "fetch.output_file".to_string(),
                reason: "Output file name cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Path of the consolidated output document
    pub fn output_path(&self) -> PathBuf {
        self.fetch.cache_dir.join(&self.fetch.output_file)
    }

    /// Per-attempt HTTP timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_seconds)
    }

    /// Base delay for exponential backoff
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_secs_f64(self.fetch.retry_base_delay_seconds)
    }

    /// Rate-limiting delay applied before each network request
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_secs_f64(self.fetch.delay_between_requests)
    }

    /// Get configuration as TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FetchError::Config {
            message: format!("Failed to serialize config to TOML: {}", e),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                school_id: "28488".to_string(),
                api_key: String::new(),
                base_url: "https://www.schoolssports.com/school/xml/mso-sport.ashx".to_string(),
                request_timeout_seconds: 10,
            },
            fetch: FetchConfig {
                cache_dir: PathBuf::from("sports_cache"),
                output_file: "consolidated_fixtures.xml".to_string(),
                max_workers: 5,
                retry_attempts: 3,
                retry_base_delay_seconds: 1.0,
                delay_between_requests: 0.1,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_worker_bounds() {
        let mut config = Config::default();
        config.fetch.max_workers = 0;
        assert!(config.validate().is_err());
        config.fetch.max_workers = 11;
        assert!(config.validate().is_err());
        config.fetch.max_workers = 10;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_bounds() {
        let mut config = Config::default();
        config.fetch.retry_attempts = 0;
        assert!(config.validate().is_err());
        config.fetch.retry_attempts = 6;
        assert!(config.validate().is_err());
        config.fetch.retry_attempts = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_delay_rejected() {
        let mut config = Config::default();
        config.fetch.delay_between_requests = -0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_path_under_cache_dir() {
        let config = Config::default();
        assert_eq!(
            config.output_path(),
            PathBuf::from("sports_cache").join("consolidated_fixtures.xml")
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::from_file("does_not_exist.toml").unwrap();
        assert_eq!(config.fetch.max_workers, 5);
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.fetch.max_workers = 3;
        config.api.api_key = "secret".to_string();
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.fetch.max_workers, 3);
        assert_eq!(loaded.api.api_key, "secret");
    }
}

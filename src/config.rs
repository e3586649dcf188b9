//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::records::{RecordsError, ReportZone};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub sleep: SleepConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    60 // uploads can be large
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Session store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_dir")]
    pub dir: String,
}

fn default_session_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("ownmyhealth").to_string_lossy().to_string())
        .unwrap_or_else(|| "./ownmyhealth_session".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dir: default_session_dir(),
        }
    }
}

impl SessionConfig {
    /// Session directory with a leading `~/` expanded
    pub fn path(&self) -> PathBuf {
        match (self.dir.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.dir),
        }
    }
}

/// Sleep aggregation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SleepConfig {
    #[serde(default = "default_max_nights")]
    pub max_nights: usize,

    #[serde(default = "default_cutoff_hour")]
    pub cutoff_hour: u32,

    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_max_nights() -> usize {
    crate::sleep::DEFAULT_MAX_NIGHTS
}

fn default_cutoff_hour() -> u32 {
    crate::sleep::DEFAULT_CUTOFF_HOUR
}

fn default_timezone() -> String {
    "local".to_string()
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            max_nights: default_max_nights(),
            cutoff_hour: default_cutoff_hour(),
            timezone: default_timezone(),
        }
    }
}

impl SleepConfig {
    /// Parsed report zone
    pub fn zone(&self) -> Result<ReportZone, RecordsError> {
        self.timezone.parse()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("ownmyhealth").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("OWNMYHEALTH_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(timeout) = std::env::var("OWNMYHEALTH_API_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.api.request_timeout_secs = secs;
            }
        }

        if let Ok(dir) = std::env::var("OWNMYHEALTH_SESSION_DIR") {
            self.session.dir = dir;
        }

        if let Ok(tz) = std::env::var("OWNMYHEALTH_TIMEZONE") {
            self.sleep.timezone = tz;
        }

        if let Ok(level) = std::env::var("OWNMYHEALTH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("OWNMYHEALTH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# OwnMyHealth Configuration
#
# Environment variables override these settings:
# - OWNMYHEALTH_API_URL
# - OWNMYHEALTH_API_TIMEOUT
# - OWNMYHEALTH_SESSION_DIR
# - OWNMYHEALTH_TIMEZONE
# - OWNMYHEALTH_LOG_LEVEL
# - OWNMYHEALTH_LOG_FORMAT

[api]
# Backend base URL (serves /upload, /records, /metrics/*)
base_url = "http://localhost:8000"

# Request timeout in seconds
request_timeout_secs = 60

[session]
# Directory holding the session file (upload result and cached records)
dir = "~/.local/share/ownmyhealth"

[sleep]
# Number of most recent nights to show
max_nights = 30

# Sleep starting before this local hour counts toward the previous night
cutoff_hour = 12

# Zone for night dates: "local", "utc" or an offset such as "+02:00"
timezone = "local"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty or json
format = "pretty"

# Optional log file path
# file = "/tmp/ownmyhealth.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.sleep.max_nights, 30);
        assert_eq!(config.sleep.cutoff_hour, 12);
        assert_eq!(config.sleep.zone().unwrap(), ReportZone::Local);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.api.request_timeout_secs, 60);
        assert_eq!(config.sleep.timezone, "local");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sleep]\nmax_nights = 14\ntimezone = \"utc\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.sleep.max_nights, 14);
        assert_eq!(config.sleep.zone().unwrap(), ReportZone::Utc);
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_session_path_expands_home() {
        let session = SessionConfig {
            dir: "/var/tmp/omh".to_string(),
        };
        assert_eq!(session.path(), PathBuf::from("/var/tmp/omh"));

        if let Some(home) = dirs::home_dir() {
            let session = SessionConfig {
                dir: "~/.local/share/ownmyhealth".to_string(),
            };
            assert_eq!(session.path(), home.join(".local/share/ownmyhealth"));
        }
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sleep\nmax_nights = ").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

//! # Application Configuration
//!
//! `machinist.toml`, environment overrides and CLI flags resolved into one
//! immutable [`AppConfig`].
//!
//! ## Precedence
//!
//! CLI flags > environment > file > defaults.
//!
//! ## Environment
//!
//! - `MACHINIST_API_KEY`: Bearer token required by the HTTP API
//! - `MACHINIST_RATE_LIMIT`: requests per second, 0 disables
//! - `MACHINIST_CORS_ORIGINS`: comma-separated origins, or `*`
//! - `MACHINIST_LOG_FORMAT`: `text` or `json`

use machinist_core::{CatalogConfig, MachinistError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "machinist.toml";

/// Default rate limit in requests per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Maximum size of a configuration file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit: u32,
    /// Empty means localhost only; `["*"]` allows every origin.
    pub cors_origins: Vec<String>,
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            rate_limit: DEFAULT_RATE_LIMIT,
            cors_origins: Vec::new(),
            api_key: None,
        }
    }
}

impl ServerConfig {
    /// The API key, if authentication is enabled.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
}

// =============================================================================
// APP CONFIG
// =============================================================================

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub server: ServerConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Load the file (explicit path, else `machinist.toml` if present) and
    /// apply environment overrides.
    ///
    /// Returns the config with the override warnings, which the caller logs
    /// once tracing is up. An explicit path that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<(Self, Vec<String>), MachinistError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        let warnings = config.apply_overrides(|key| std::env::var(key).ok());
        Ok((config, warnings))
    }

    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, MachinistError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            MachinistError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(MachinistError::IoError(format!(
                "Config file {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            MachinistError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, MachinistError> {
        toml::from_str(text)
            .map_err(|e| MachinistError::SerializationError(format!("Invalid config: {}", e)))
    }

    /// Apply `MACHINIST_*` overrides from a variable lookup.
    ///
    /// Unparseable values keep the previous value; one warning per ignored
    /// variable is returned.
    #[must_use]
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(key) = lookup("MACHINIST_API_KEY").filter(|k| !k.is_empty()) {
            self.server.api_key = Some(key);
        }
        if let Some(raw) = lookup("MACHINIST_RATE_LIMIT") {
            match raw.trim().parse() {
                Ok(limit) => self.server.rate_limit = limit,
                Err(_) => {
                    warnings.push(format!("Ignoring invalid MACHINIST_RATE_LIMIT '{}'", raw));
                }
            }
        }
        if let Some(raw) = lookup("MACHINIST_CORS_ORIGINS") {
            self.server.cors_origins = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(raw) = lookup("MACHINIST_LOG_FORMAT") {
            match LogFormat::parse(&raw) {
                Some(format) => self.log.format = format,
                None => {
                    warnings.push(format!("Ignoring invalid MACHINIST_LOG_FORMAT '{}'", raw));
                }
            }
        }
        warnings
    }
}

// =============================================================================
// TESTS
// =============================================================================

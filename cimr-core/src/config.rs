use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CimrConfig {
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
    pub display: DisplayConfig,
    /// Team id -> backend module name.
    pub modules: ModuleMapping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,

    /// Unset means requests wait forever, like the browser client did.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub color: bool,

    #[serde(default = "default_time_format")]
    pub time_format: String,
}

/// Maps registry team ids onto the module names the backend's `/query`
/// endpoint understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleMapping(HashMap<String, String>);

impl ModuleMapping {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self(entries)
    }

    pub fn module_for(&self, team_id: &str) -> Option<&str> {
        self.0.get(team_id).map(String::as_str)
    }

    pub fn insert(&mut self, team_id: impl Into<String>, module: impl Into<String>) {
        self.0.insert(team_id.into(), module.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ModuleMapping {
    fn default() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            "company_valuation".to_string(),
            "company_valuation".to_string(),
        );
        entries.insert(
            "company_valuation_v2".to_string(),
            "company_valuation_v2".to_string(),
        );
        Self(entries)
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}

fn default_time_format() -> String {
    "%H:%M".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            request_timeout_secs: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            time_format: default_time_format(),
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

impl CimrConfig {
    pub fn load() -> Result<Self, ConfigLoadError> {
        load_dotenv_files();
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> Result<Self, ConfigLoadError> {
        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("CIMR")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;

        let mut cimr_config: CimrConfig = config.try_deserialize()?;

        if let Ok(url) = std::env::var("CIMR_BACKEND_URL") {
            cimr_config.backend.url = url;
        } else if let Ok(url) = std::env::var("BACKEND_URL") {
            cimr_config.backend.url = url;
        }

        if let Ok(level) = std::env::var("CIMR_LOG_LEVEL") {
            cimr_config.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            cimr_config.logging.level = level;
        }

        if let Ok(timeout) = std::env::var("CIMR_REQUEST_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                cimr_config.backend.request_timeout_secs = Some(secs);
            }
        }

        cimr_config.normalize();
        cimr_config.validate()?;

        Ok(cimr_config)
    }

    /// Strips whitespace and the trailing slash from the backend URL so
    /// endpoint paths can be appended directly.
    pub fn normalize(&mut self) {
        let trimmed = self.backend.url.trim().trim_end_matches('/').to_string();
        self.backend.url = if trimmed.is_empty() {
            default_backend_url()
        } else {
            trimmed
        };
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.backend.url.is_empty() {
            return Err(ConfigLoadError::MissingRequired("backend.url".to_string()));
        }

        if !self.backend.url.starts_with("http://") && !self.backend.url.starts_with("https://")
        {
            return Err(ConfigLoadError::InvalidValue {
                key: "backend.url".to_string(),
                message: "Must start with http:// or https://".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
            return Err(ConfigLoadError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    pub fn backend_url(&self) -> &str {
        &self.backend.url
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("cimr.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("cimr").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".cimr").join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    for path in get_dotenv_paths() {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

fn get_dotenv_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".cimr").join(".env"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("cimr").join(".env"));
    }

    paths
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cimr"))
}

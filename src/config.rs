//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::aggregator::AggregatorConfig;
use crate::client::{ClientConfig, DEFAULT_API_URL};
use crate::preferences::{self, PreferenceStore, Theme};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub paging: PagingConfig,

    #[serde(default)]
    pub theme: ThemeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Entity API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Static headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    format!("dattebayo/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            headers: HashMap::new(),
            request_timeout_ms: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl From<&ApiConfig> for ClientConfig {
    fn from(api: &ApiConfig) -> Self {
        ClientConfig {
            base_url: api.base_url.clone(),
            headers: api.headers.clone(),
            request_timeout_ms: api.request_timeout_ms,
            user_agent: api.user_agent.clone(),
        }
    }
}

/// Pagination and search behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct PagingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_page_size_usize")]
    pub initial_count: usize,

    #[serde(default = "default_page_size_usize")]
    pub show_more_increment: usize,

    #[serde(default = "default_max_probe_pages")]
    pub max_probe_pages: u32,

    #[serde(default = "default_search_debounce")]
    pub search_debounce_ms: u64,
}

fn default_page_size() -> u32 {
    12
}

fn default_page_size_usize() -> usize {
    12
}

fn default_max_probe_pages() -> u32 {
    10
}

fn default_search_debounce() -> u64 {
    400
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            initial_count: default_page_size_usize(),
            show_more_increment: default_page_size_usize(),
            max_probe_pages: default_max_probe_pages(),
            search_debounce_ms: default_search_debounce(),
        }
    }
}

impl PagingConfig {
    pub fn aggregator(&self) -> AggregatorConfig {
        AggregatorConfig {
            page_size: self.page_size,
            initial_target: self.initial_count,
            show_more_increment: self.show_more_increment,
            max_probe_pages: self.max_probe_pages,
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Theme preference storage
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeConfig {
    #[serde(default = "default_prefs_path")]
    pub prefs_path: String,

    /// Theme used when nothing is stored yet ("light" or "dark")
    #[serde(default = "default_theme")]
    pub default: String,
}

fn default_prefs_path() -> String {
    preferences::default_prefs_path().to_string_lossy().to_string()
}

fn default_theme() -> String {
    "light".to_string()
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            prefs_path: default_prefs_path(),
            default: default_theme(),
        }
    }
}

impl ThemeConfig {
    pub fn store(&self) -> PreferenceStore {
        let default = self.default.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Invalid default theme, using light");
            Theme::Light
        });
        PreferenceStore::new(&self.prefs_path, default)
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

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
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
            dirs::config_dir().map(|p| p.join("dattebayo").join("config.toml")),
            Some(PathBuf::from("./dattebayo.toml")),
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
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(url) = var("DATTEBAYO_API_URL") {
            self.api.base_url = url;
        }
        if let Some(timeout) = var("DATTEBAYO_API_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse() {
                self.api.request_timeout_ms = ms;
            }
        }

        // Paging overrides
        if let Some(size) = var("DATTEBAYO_PAGE_SIZE") {
            if let Ok(n) = size.parse() {
                self.paging.page_size = n;
            }
        }

        // Theme overrides
        if let Some(path) = var("DATTEBAYO_PREFS_PATH") {
            self.theme.prefs_path = path;
        }

        // Logging overrides
        if let Some(level) = var("DATTEBAYO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("DATTEBAYO_LOG_FORMAT") {
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
    r#"# Dattebayo Configuration
#
# Environment variables override these settings:
# - DATTEBAYO_API_URL
# - DATTEBAYO_API_TIMEOUT_MS
# - DATTEBAYO_PAGE_SIZE
# - DATTEBAYO_PREFS_PATH
# - DATTEBAYO_LOG_LEVEL
# - DATTEBAYO_LOG_FORMAT

[api]
# Entity API base URL
base_url = "https://dattebayo-api.onrender.com"

# Request timeout in milliseconds
request_timeout_ms = 10000

# Static headers sent with every request
# [api.headers]
# Authorization = "Bearer <token>"

[paging]
# Records requested per page
page_size = 12

# Records shown on first load
initial_count = 12

# Records added by "show more"
show_more_increment = 12

# Pages a single load may request before giving up
max_probe_pages = 10

# Quiet interval before a search runs (ms)
search_debounce_ms = 400

[theme]
# Where the theme preference is stored
# prefs_path = "~/.local/share/dattebayo/prefs.json"

# Theme used until one is saved: light or dark
default = "light"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/dattebayo/dattebayo.log"
"#
    .to_string()
}

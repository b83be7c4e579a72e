//! Bootstrap configuration loading
//!
//! Settings resolution priority (highest first):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! This module owns tiers 3 and 4. Services layer CLI and environment
//! overrides on top of the loaded [`TomlConfig`].

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bootstrap configuration loaded from TOML file
///
/// Every field has a built-in default, so an empty file (or no file at all)
/// yields a usable configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// API key for the external text generation service
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Generation engine tuning
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            logging: LoggingConfig::default(),
            gemini_api_key: None,
            cache: CacheConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Response cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Redis connection URL (`redis://` or `rediss://`). In-process cache when absent.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Entry lifetime in seconds
    #[serde(default = "default_cache_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Upper bound on a single cache round trip in milliseconds
    #[serde(default = "default_cache_op_timeout_ms")]
    pub op_timeout_ms: u64,

    /// Entry cap for the in-process cache
    #[serde(default = "default_memory_max_entries")]
    pub memory_max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl_seconds: default_cache_ttl_seconds(),
            op_timeout_ms: default_cache_op_timeout_ms(),
            memory_max_entries: default_memory_max_entries(),
        }
    }
}

/// Generation engine tuning
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Attempts per external call when rate limited
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First backoff delay in milliseconds (doubles per retry)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Jitter band as a fraction of the delay (0.5 = ±50%)
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,

    /// Deadline for a single external call in milliseconds
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Deadline for a whole generation request in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Concurrent psychology generations per request
    #[serde(default = "default_psychology_concurrency")]
    pub psychology_concurrency: usize,

    /// Palette size used when the request does not carry one
    #[serde(default = "default_palette_size")]
    pub default_palette_size: usize,

    /// Model used for text prompts
    #[serde(default = "default_prompt_model")]
    pub prompt_model: String,

    /// Model used for image-mode requests
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Serve fallback-only palettes (200 + warning) when no API key is configured
    #[serde(default)]
    pub allow_fallback_without_credentials: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            jitter_factor: default_jitter_factor(),
            call_timeout_ms: default_call_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            psychology_concurrency: default_psychology_concurrency(),
            default_palette_size: default_palette_size(),
            prompt_model: default_prompt_model(),
            image_model: default_image_model(),
            allow_fallback_without_credentials: false,
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5730
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cache_ttl_seconds() -> u64 {
    3600
}

fn default_cache_op_timeout_ms() -> u64 {
    2000
}

fn default_memory_max_entries() -> usize {
    10_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_jitter_factor() -> f64 {
    0.5
}

fn default_call_timeout_ms() -> u64 {
    30_000
}

fn default_request_timeout_ms() -> u64 {
    120_000
}

fn default_psychology_concurrency() -> usize {
    2
}

fn default_palette_size() -> usize {
    5
}

fn default_prompt_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-1.5-flash-8b".to_string()
}

/// Default configuration file path for the platform
///
/// `~/.config/huemood/config.toml` on Linux, the platform config dir elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("huemood").join("config.toml"))
}

/// Load bootstrap configuration
///
/// An explicitly requested file must exist. When no path is given, the
/// platform default location is tried and built-in defaults are used if
/// nothing is there.
pub fn load_toml_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit_path {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return read_toml_config(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => read_toml_config(&path),
        Some(path) => {
            debug!("No config file at {}, using built-in defaults", path.display());
            Ok(TomlConfig::default())
        }
        None => {
            debug!("Could not determine config directory, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}

fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

//! Configuration resolution for huemood-gen
//!
//! Provides multi-tier resolution with CLI → ENV → TOML priority for the
//! settings that carry secrets or deployment endpoints.

use huemood_common::config::TomlConfig;
use tracing::{info, warn};

/// Primary environment variable for the generation API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Legacy environment variable, accepted as an alias
pub const API_KEY_ENV_ALIAS: &str = "NEXT_PUBLIC_GEMINI_API_KEY";

/// Environment variable for the Redis connection URL
pub const REDIS_URL_ENV: &str = "REDIS_URL";

/// Resolve the generation API key
///
/// **Priority:** CLI → `GEMINI_API_KEY` → `NEXT_PUBLIC_GEMINI_API_KEY` → TOML
///
/// Returns `None` when no source carries a usable key; the service then runs
/// without credentials.
pub fn resolve_gemini_api_key(cli_key: Option<&str>, toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(API_KEY_ENV).ok();
    let env_alias_key = std::env::var(API_KEY_ENV_ALIAS).ok();

    let candidates = [
        ("command line", cli_key.map(str::to_string)),
        ("environment", env_key),
        ("environment (legacy name)", env_alias_key),
        ("TOML", toml_config.gemini_api_key.clone()),
    ];

    let sources: Vec<&str> = candidates
        .iter()
        .filter(|(_, key)| key.as_deref().is_some_and(is_valid_key))
        .map(|(source, _)| *source)
        .collect();

    if sources.len() > 1 {
        warn!(
            "Gemini API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    for (source, key) in candidates {
        if let Some(key) = key.filter(|k| is_valid_key(k)) {
            info!("Gemini API key loaded from {}", source);
            return Some(key.trim().to_string());
        }
    }

    warn!(
        "Gemini API key not configured. Set {} or gemini_api_key in the TOML config.",
        API_KEY_ENV
    );
    None
}

/// Resolve the Redis URL
///
/// **Priority:** CLI → `REDIS_URL` → TOML `cache.redis_url`
pub fn resolve_redis_url(cli_url: Option<&str>, toml_config: &TomlConfig) -> Option<String> {
    cli_url
        .map(str::to_string)
        .or_else(|| std::env::var(REDIS_URL_ENV).ok())
        .or_else(|| toml_config.cache.redis_url.clone())
        .filter(|url| !url.trim().is_empty())
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

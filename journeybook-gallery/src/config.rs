//! Settings resolution for the gallery
//!
//! Provides two-tier resolution with ENV → TOML priority for the generation
//! API endpoint and key, then falls back to built-in defaults.

use crate::models::{Language, Settings};
use journeybook_common::config::TomlConfig;
use std::time::Duration;
use tracing::{info, warn};

pub const API_URL_ENV: &str = "JOURNEYBOOK_API_URL";
pub const API_KEY_ENV: &str = "JOURNEYBOOK_API_KEY";

/// Resolve runtime settings from the TOML config and the environment
pub fn resolve_settings(toml_config: &TomlConfig) -> Settings {
    let api = &toml_config.api;
    let defaults = Settings::default();

    let language = match api.language.as_deref() {
        Some(raw) => raw.parse::<Language>().unwrap_or_else(|e| {
            warn!("{}, using {}", e, defaults.language);
            defaults.language
        }),
        None => defaults.language,
    };

    let api_url = resolve_value("API URL", API_URL_ENV, api.url.as_deref());
    let api_key = resolve_value("API key", API_KEY_ENV, api.key.as_deref());

    let settings = Settings {
        language,
        api_url,
        api_key,
        image_api_url: api.image_url.clone().filter(|url| is_valid_key(url)),
        model: api
            .model
            .clone()
            .filter(|m| is_valid_key(m))
            .unwrap_or(defaults.model),
        request_timeout: api
            .request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout),
    };

    if settings.is_api_configured() {
        info!("Generation API configured, descriptions will be derived on import");
    } else {
        info!("Generation API not configured, imports will copy images only");
    }

    settings
}

/// Pick a value from the environment, then TOML
fn resolve_value(label: &str, env_name: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_name).ok().filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in both environment and TOML config. Using environment variable {}.",
            label, env_name
        );
    }

    if let Some(value) = env_value {
        info!("{} loaded from environment variable", label);
        return Some(value.trim().to_string());
    }

    toml_value.map(|value| {
        info!("{} loaded from TOML config", label);
        value.trim().to_string()
    })
}

/// Validate a key or endpoint (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

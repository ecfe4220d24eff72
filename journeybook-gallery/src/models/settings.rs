//! Resolved runtime settings
//!
//! Built by [`crate::config::resolve_settings`] from TOML, environment and
//! built-in defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4-vision-preview";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Prompt language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "en")]
    En,
}

impl Language {
    /// Prompt sent with each image to the description generator
    pub fn description_prompt(&self) -> &'static str {
        match self {
            Language::ZhCn => "扫描这张图片，用一段话详细描述这张图片，最后结尾不要有句号",
            Language::En => "Scan this image and provide a detailed description in one paragraph. Do not end with a period",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::ZhCn => "zh-CN",
            Language::En => "en",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "zh-CN" | "zh-cn" | "zh" => Ok(Language::ZhCn),
            "en" | "en-US" | "en-us" => Ok(Language::En),
            other => Err(format!("unsupported language '{}'", other)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Settings the gallery core consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub language: Language,
    /// Description (chat-completion) endpoint
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    /// Image generation endpoint; `api_url` is used when unset
    pub image_api_url: Option<String>,
    pub model: String,
    pub request_timeout: Duration,
}

impl Settings {
    /// Both endpoint and key present: generators may be built
    pub fn is_api_configured(&self) -> bool {
        self.api_url.is_some() && self.api_key.is_some()
    }

    pub fn image_endpoint(&self) -> Option<&str> {
        self.image_api_url.as_deref().or(self.api_url.as_deref())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            api_url: None,
            api_key: None,
            image_api_url: None,
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

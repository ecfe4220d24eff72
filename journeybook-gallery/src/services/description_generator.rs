//! Description generation collaborator
//!
//! The ingestion pipeline depends only on [`DescriptionGenerator`]. The
//! HTTP implementation speaks the OpenAI-compatible chat-completions shape:
//! one user message carrying the prompt and the image as a base64 data URL.

use async_trait::async_trait;
use base64::Engine as _;
use journeybook_common::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::models::Settings;

const USER_AGENT: &str = concat!("JourneyBook/", env!("CARGO_PKG_VERSION"));
const MAX_TOKENS: u32 = 300;

/// Generation collaborator errors (shared by description and image generation)
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GenerationError> for Error {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Network(msg) => Error::Network(msg),
            GenerationError::Api(status, body) => {
                Error::Network(format!("request failed with status code {}: {}", status, body))
            }
            GenerationError::MalformedResponse(msg) => Error::MalformedResponse(msg),
            GenerationError::Io(e) => Error::Io(e),
        }
    }
}

/// Produces a textual description of an image
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    async fn describe(&self, image_path: &Path, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Encode image bytes as a `data:` URL, sniffing the MIME type
pub fn image_bytes_to_data_url(bytes: &[u8]) -> String {
    let mime = infer::get(bytes)
        .map(|t| t.mime_type())
        .filter(|m| m.starts_with("image/"))
        .unwrap_or("image/jpeg");
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, b64)
}

/// Build the shared reqwest client (bearer auth is added per request)
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, GenerationError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| GenerationError::Network(e.to_string()))
}

/// Chat-completions description generator
pub struct HttpDescriptionGenerator {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpDescriptionGenerator {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Build from settings; `None` when endpoint or key is missing
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>, GenerationError> {
        match (&settings.api_url, &settings.api_key) {
            (Some(url), Some(key)) => Ok(Some(Self::new(
                url.clone(),
                key.clone(),
                settings.model.clone(),
                settings.request_timeout,
            )?)),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl DescriptionGenerator for HttpDescriptionGenerator {
    async fn describe(&self, image_path: &Path, prompt: &str) -> Result<String, GenerationError> {
        let bytes = tokio::fs::read(image_path).await?;
        let data_url = image_bytes_to_data_url(&bytes);

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: MAX_TOKENS,
        };

        tracing::debug!(
            image = %image_path.display(),
            bytes = bytes.len(),
            "Requesting image description"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api(status.as_u16(), error_text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        let description = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if description.is_empty() {
            return Err(GenerationError::MalformedResponse(
                "No valid description received".to_string(),
            ));
        }

        tracing::info!(
            image = %image_path.display(),
            chars = description.chars().count(),
            "Image description received"
        );

        Ok(description)
    }
}

//! Image generation collaborator
//!
//! Two HTTP calls: one asking the endpoint for an image URL, one fetching the
//! bytes behind that URL. Persisting the bytes is the gallery's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::Settings;
use crate::services::description_generator::{build_http_client, GenerationError};

const IMAGE_SIZE: &str = "1024x1024";

/// Turns a prompt into image bytes, via a remote URL
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Ask the generation endpoint for an image; returns its remote URL
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Fetch the bytes behind a URL returned by [`ImageGenerator::generate`]
    async fn download(&self, url: &str) -> Result<Vec<u8>, GenerationError>;
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

/// Image generator over an OpenAI-compatible images endpoint
pub struct HttpImageGenerator {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpImageGenerator {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Build from settings; `None` when endpoint or key is missing
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>, GenerationError> {
        match (settings.image_endpoint(), &settings.api_key) {
            (Some(url), Some(key)) => Ok(Some(Self::new(url, key.clone(), settings.request_timeout)?)),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl ImageGenerator for HttpImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerationRequest {
            prompt,
            n: 1,
            size: IMAGE_SIZE,
        };

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

        let generated: GenerationResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        generated
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::MalformedResponse(
                    "API response did not contain image data".to_string(),
                )
            })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, GenerationError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api(status.as_u16(), error_text));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        tracing::debug!(bytes = bytes.len(), "Downloaded generated image");
        Ok(bytes.to_vec())
    }
}

//! Gemini text generation client
//!
//! Calls the `generateContent` endpoint over HTTPS and classifies failures
//! for the retry controller:
//! - 429 → [`GenerationError::RateLimited`]
//! - network errors, timeouts, 5xx → [`GenerationError::Transient`]
//! - other statuses, unreadable bodies, empty candidates → [`GenerationError::Fatal`]

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::text_generator::{GenerationError, GeneratorSet, TextGenerator};
use huemood_common::{Error, Result};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const USER_AGENT: &str = concat!("huemood/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Gemini API client
///
/// Holds one HTTP connection pool; [`GeminiClient::model`] hands out cheap
/// per-model generators sharing it.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: Arc<str>,
    base_url: Arc<str>,
}

impl GeminiClient {
    pub fn new(api_key: &str, call_timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_key, call_timeout, GEMINI_BASE_URL)
    }

    /// Client against a custom endpoint (tests, proxies)
    pub fn with_base_url(api_key: &str, call_timeout: Duration, base_url: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Config("Gemini API key not configured".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(call_timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: Arc::from(api_key.trim()),
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    /// Generator bound to one model
    pub fn model(&self, model: &str) -> GeminiModel {
        GeminiModel {
            client: self.clone(),
            model: model.to_string(),
        }
    }

    /// Generators for prompt and image modes
    pub fn generator_set(&self, prompt_model: &str, image_model: &str) -> GeneratorSet {
        GeneratorSet::new(
            Arc::new(self.model(prompt_model)),
            Arc::new(self.model(image_model)),
        )
    }
}

/// One Gemini model, usable as a [`TextGenerator`]
#[derive(Clone)]
pub struct GeminiModel {
    client: GeminiClient,
    model: String,
}

#[async_trait]
impl TextGenerator for GeminiModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.client.base_url, self.model
        );
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Calling Gemini API");

        let response = self
            .client
            .http_client
            .post(&url)
            .header("x-goog-api-key", self.client.api_key.as_ref())
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transient(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerationError::RateLimited);
        }

        if status.is_server_error() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Transient(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Fatal(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Fatal(format!("Unreadable response: {}", e)))?;

        let text = parsed
            .into_text()
            .ok_or_else(|| GenerationError::Fatal("Response contained no text".to_string()))?;

        tracing::debug!(model = %self.model, response_len = text.len(), "Gemini API responded");

        Ok(text)
    }
}

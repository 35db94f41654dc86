//! Gemini API client implementation
//!
//! Implements the GenerationClient trait over Gemini's generateContent
//! endpoint. No retry logic lives here: transient-failure handling is the
//! retry controller's job, so this client reports errors faithfully and
//! nothing more.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{GenerationClient, GenerationError};
use crate::config::GenerationConfig;

/// Gemini API client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in the config.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        debug!(model = %config.model, "GeminiClient::from_config: called");
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            GenerationError::InvalidResponse(format!(
                "API key not found: set the {} environment variable",
                config.api_key_env
            ))
        })?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(GenerationError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "maxOutputTokens": self.max_output_tokens,
            }
        })
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "generate: called");
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&self.build_request_body(prompt))
            .send()
            .await
            .map_err(GenerationError::Network)?;

        let status = response.status().as_u16();

        if status == 429 {
            let message = response.text().await.unwrap_or_default();
            debug!("generate: rate limited (429)");
            return Err(GenerationError::RateLimited { message });
        }

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status, "generate: API error");
            return Err(GenerationError::Api { status, message });
        }

        let api_response: GeminiResponse = response.json().await.map_err(GenerationError::Network)?;

        let text: String = api_response
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerationError::InvalidResponse(
                "response contained no text candidates".to_string(),
            ));
        }

        debug!(text_len = text.len(), "generate: success");
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

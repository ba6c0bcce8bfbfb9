//! Gemini API client implementation
//!
//! Implements the LlmClient trait for the Google Generative Language
//! `generateContent` endpoint, with retry/backoff on transient errors.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, ModelVariant, TokenUsage};
use crate::config::LlmConfig;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Gemini API client
///
/// Holds both model identifiers; the request's `ModelVariant` picks
/// which one a call runs on. Constructed without a key it fails
/// per-call with `MissingApiKey`, never at startup.
pub struct GeminiClient {
    model: String,
    title_model: String,
    api_key: Option<String>,
    base_url: String,
    http: Client,
    max_tokens: u32,
}

impl GeminiClient {
    /// Create a new client from configuration
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, title_model = %config.title_model, "from_config: called");
        let api_key = config.api_key();
        if api_key.is_none() {
            warn!("from_config: no API key configured; model calls will fail until one is set");
        }

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            title_model: config.title_model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_tokens: config.max_tokens,
        })
    }

    /// Model identifier for a variant
    fn model_for(&self, variant: ModelVariant) -> &str {
        match variant {
            ModelVariant::Capable => &self.model,
            ModelVariant::Fast => &self.title_model,
        }
    }

    /// Build the request body for the generateContent API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(variant = %request.variant, %request.max_tokens, "build_request_body: called");
        let max_tokens = request.max_tokens.min(self.max_tokens);

        serde_json::json!({
            "system_instruction": {
                "parts": [{ "text": request.system_prompt }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }]
            }],
            "generationConfig": {
                "maxOutputTokens": max_tokens
            }
        })
    }

    /// Parse the generateContent response
    ///
    /// Empty candidate text is an `InvalidResponse`, not a silent
    /// empty string; the engine's fallback policy depends on that.
    fn parse_response(&self, api_response: GeminiResponse) -> Result<CompletionResponse, LlmError> {
        let usage = api_response
            .usage_metadata
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        let text: String = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(LlmError::InvalidResponse("Empty response text".to_string()));
        }

        Ok(CompletionResponse { text, usage })
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = self.model_for(request.variant).to_string();
        debug!(%model, variant = %request.variant, prompt_len = request.prompt.len(), "complete: called");

        let api_key = self.api_key.as_ref().ok_or(LlmError::MissingApiKey)?;

        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let body = self.build_request_body(&request);

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(attempt, backoff_ms = backoff, "complete: retrying after transient error");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let response = match self
                .http
                .post(&url)
                .header("x-goog-api-key", api_key)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    debug!(attempt, error = %e, "complete: network error");
                    last_error = Some(LlmError::Network(e));
                    continue;
                }
            };

            let status = response.status().as_u16();

            if status == 429 {
                debug!("complete: rate limited (429)");
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);

                return Err(LlmError::RateLimited {
                    retry_after: Duration::from_secs(retry_after),
                });
            }

            if is_retryable_status(status) && attempt < MAX_RETRIES {
                let text = response.text().await.unwrap_or_default();
                debug!(attempt, status, "complete: retryable error");
                last_error = Some(LlmError::ApiError { status, message: text });
                continue;
            }

            if !response.status().is_success() {
                debug!(%status, "complete: API error");
                let text = response.text().await.unwrap_or_default();
                return Err(LlmError::ApiError { status, message: text });
            }

            let api_response: GeminiResponse = response.json().await?;
            let completion = self.parse_response(api_response)?;
            info!(
                %model,
                text_len = completion.text.len(),
                input_tokens = completion.usage.input_tokens,
                output_tokens = completion.usage.output_tokens,
                "complete: success"
            );
            return Ok(completion);
        }

        Err(last_error.unwrap_or_else(|| LlmError::InvalidResponse("Max retries exceeded".to_string())))
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient {
            model: "gemini-2.5-pro".to_string(),
            title_model: "gemini-2.5-flash".to_string(),
            api_key: Some("test-key".to_string()),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            http: Client::new(),
            max_tokens: 8192,
        }
    }

    fn request(variant: ModelVariant, max_tokens: u32) -> CompletionRequest {
        CompletionRequest {
            system_prompt: "You are helpful".to_string(),
            prompt: "Hello".to_string(),
            variant,
            max_tokens,
        }
    }

    #[test]
    fn test_build_request_body_basic() {
        let client = client();
        let body = client.build_request_body(&request(ModelVariant::Capable, 1000));

        assert_eq!(body["system_instruction"]["parts"][0]["text"], "You are helpful");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
    }

    #[test]
    fn test_max_tokens_capped() {
        let client = client();
        let body = client.build_request_body(&request(ModelVariant::Capable, 50_000));
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[test]
    fn test_variant_picks_model() {
        let client = client();
        assert_eq!(client.model_for(ModelVariant::Capable), "gemini-2.5-pro");
        assert_eq!(client.model_for(ModelVariant::Fast), "gemini-2.5-flash");
    }

    #[test]
    fn test_parse_response_concatenates_parts() {
        let client = client();
        let api_response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "world" }] }
            }],
            "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 2 }
        }))
        .unwrap();

        let completion = client.parse_response(api_response).unwrap();
        assert_eq!(completion.text, "Hello world");
        assert_eq!(completion.usage.input_tokens, 10);
        assert_eq!(completion.usage.output_tokens, 2);
    }

    #[test]
    fn test_parse_response_empty_is_invalid() {
        let client = client();
        let api_response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": []
        }))
        .unwrap();

        let err = client.parse_response(api_response).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_is_retryable_status() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(503));
        assert!(is_retryable_status(408));
        assert!(!is_retryable_status(200));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(401));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_per_call() {
        let client = GeminiClient {
            api_key: None,
            ..client()
        };
        let err = client.complete(request(ModelVariant::Fast, 100)).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }
}

//! Request/response types for LLM completions

use serde::{Deserialize, Serialize};

/// Which model tier a request should run on
///
/// Drafts and questions go to the capable model; titles go to the
/// fast model. The tradeoff is deliberate: title quality tolerates a
/// cheaper model, which bounds latency and cost for a low-stakes
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    /// Full-capability model for draft and question generation
    Capable,
    /// Cheap/fast model for title generation
    Fast,
}

impl std::fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Capable => write!(f, "capable"),
            Self::Fast => write!(f, "fast"),
        }
    }
}

/// A single completion request
///
/// Each request is independent; no conversation state is kept between
/// calls. The engine re-sends everything the model needs every time.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction for the model
    pub system_prompt: String,
    /// The user-turn prompt body
    pub prompt: String,
    /// Model tier to use
    pub variant: ModelVariant,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A completed model response
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text (non-empty; empty output is an error upstream)
    pub text: String,
    /// Token usage for logging
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Convenience constructor for tests and fallbacks
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: TokenUsage::default(),
        }
    }
}

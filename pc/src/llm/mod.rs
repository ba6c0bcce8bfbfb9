//! LLM client module for PatentChat
//!
//! Provides the model-client abstraction the draft engine runs on:
//! a single `complete` call per request, two model tiers, and a typed
//! error taxonomy the engine's fallback policy keys off.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use types::{CompletionRequest, CompletionResponse, ModelVariant, TokenUsage};

use crate::config::LlmConfig;

/// Create an LLM client from configuration
///
/// Resolves env overrides first, then builds the Gemini client. A
/// missing credential is not an error here; it surfaces per-call.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    let resolved = config.clone().resolve();
    debug!(model = %resolved.model, title_model = %resolved.title_model, "create_client: called");
    Ok(Arc::new(GeminiClient::from_config(&resolved)?))
}

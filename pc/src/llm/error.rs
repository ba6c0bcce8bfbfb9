//! LLM error taxonomy

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by LLM clients
///
/// The draft engine treats every variant the same way (degrade to the
/// documented fallback value), but logs distinguish the unavailable
/// class from invalid responses.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API credential configured; every call fails here rather
    /// than at startup so the system stays explorable offline
    #[error("No API key configured (set GEMINI_API_KEY or GOOGLE_API_KEY)")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// True when the model could not be reached at all
    /// (network/auth/quota), false for `InvalidResponse` (the model
    /// answered but the output was empty or unparsable)
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, Self::InvalidResponse(_))
    }
}

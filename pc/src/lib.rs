//! PatentChat - LLM-guided patent specification drafting
//!
//! A thin orchestration layer over a text-generation API: it builds
//! prompts from templates and accumulated state, sends them to a
//! model, and folds the output back into a growing document plus a
//! list of follow-up yes/no questions.
//!
//! # Core Concepts
//!
//! - **From-Scratch Regeneration**: every regeneration re-derives the
//!   whole draft from the idea description and all answered turns;
//!   the model never patches the previous draft
//! - **Append-Only Conversation**: the Q&A history is an audit trail
//!   the model re-reads on every regeneration
//! - **Graceful Degradation**: model failures never crash an
//!   operation; each has a documented fallback value, so the system
//!   works without credentials
//!
//! # Modules
//!
//! - [`llm`] - LLM client trait and Gemini implementation
//! - [`prompts`] - Prompt templates and instruction-document selection
//! - [`engine`] - The draft/question regeneration cycle
//! - [`conversation`] - Transcript rendering for prompts
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod conversation;
pub mod engine;
pub mod llm;
pub mod prompts;

// Re-export commonly used types
pub use config::{Config, InstructionPaths, LlmConfig};
pub use conversation::format_transcript;
pub use engine::{DraftEngine, EngineError, MAX_QUESTIONS};
pub use llm::{CompletionRequest, CompletionResponse, GeminiClient, LlmClient, LlmError, ModelVariant, create_client};
pub use prompts::{PromptContext, PromptLoader};

//! Prompt template system
//!
//! Loads and renders `.pmt` (prompt template) files for the draft
//! engine's four operations, and selects the active instruction
//! document.
//!
//! Template loading chain:
//! 1. `.patentchat/prompts/{name}.pmt` (user override)
//! 2. Embedded fallback in code
//!
//! Instruction document chain (re-checked at every call):
//! 1. Primary document path
//! 2. Fallback document path
//! 3. Embedded sample
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{PromptContext, PromptLoader};

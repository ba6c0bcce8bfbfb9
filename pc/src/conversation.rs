//! Transcript rendering for regeneration prompts
//!
//! The conversation history is re-read by the model on every
//! regeneration; this module renders it deterministically. Unanswered
//! turns are pending questions, not incorporated facts, so they are
//! excluded.

use ideastore::Idea;
use tracing::debug;

/// Marker used when no turn has been answered yet
pub const EMPTY_TRANSCRIPT: &str = "(no questions answered yet)";

/// Render all answered turns as an ordered Q/A transcript
///
/// Output is one `Q: ...\nA: yes|no` block per answered turn,
/// blocks separated by blank lines, in conversation order.
pub fn format_transcript(idea: &Idea) -> String {
    let blocks: Vec<String> = idea
        .answered_turns()
        .map(|turn| format!("Q: {}\nA: {}", turn.question, turn.answer))
        .collect();

    debug!(id = %idea.id, answered = blocks.len(), total = idea.conversation.len(), "format_transcript: rendered");

    if blocks.is_empty() {
        EMPTY_TRANSCRIPT.to_string()
    } else {
        blocks.join("\n\n")
    }
}

//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// First-draft bootstrap prompt
pub const BOOTSTRAP: &str = include_str!("../../prompts/bootstrap.pmt");

/// Yes/no question generator prompt
pub const QUESTIONS: &str = include_str!("../../prompts/questions.pmt");

/// From-scratch regeneration prompt
pub const REGENERATE: &str = include_str!("../../prompts/regenerate.pmt");

/// Title generator prompt
pub const TITLE: &str = include_str!("../../prompts/title.pmt");

/// Built-in instruction document, used when neither candidate file
/// exists on disk
pub const SAMPLE_INSTRUCTIONS: &str = include_str!("../../prompts/sample_instructions.md");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "bootstrap" => Some(BOOTSTRAP),
        "questions" => Some(QUESTIONS),
        "regenerate" => Some(REGENERATE),
        "title" => Some(TITLE),
        _ => {
            debug!(%name, "get_embedded: no match found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_all_templates() {
        for name in ["bootstrap", "questions", "regenerate", "title"] {
            assert!(get_embedded(name).is_some(), "missing template: {}", name);
        }
    }

    #[test]
    fn test_questions_template_contract() {
        let questions = get_embedded("questions").unwrap();
        assert!(questions.contains("yes or no"));
        assert!(questions.contains("{{num_questions}}"));
        // Claim-context policy lives in the prompt, not in a post-hoc transform
        assert!(questions.contains("numbered claim"));
        assert!(questions.contains("no preamble"));
    }

    #[test]
    fn test_regenerate_template_is_from_scratch() {
        let regenerate = get_embedded("regenerate").unwrap();
        assert!(regenerate.contains("do not assume any earlier draft exists"));
        assert!(regenerate.contains("{{transcript}}"));
        assert!(regenerate.contains("{{description}}"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }

    #[test]
    fn test_sample_instructions_has_sections() {
        assert!(SAMPLE_INSTRUCTIONS.contains("## 8. Draft claims"));
        assert!(SAMPLE_INSTRUCTIONS.contains("Technical field"));
    }
}

//! Prompt loader
//!
//! Loads prompt templates from files or falls back to embedded
//! defaults, and selects the active instruction document.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;
use crate::config::InstructionPaths;

/// Context for rendering prompt templates
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptContext {
    /// The active instruction document, verbatim
    pub instructions: String,
    /// The user's raw idea text
    pub description: String,
    /// Current draft markdown
    pub draft: String,
    /// Transcript of answered turns
    pub transcript: String,
    /// How many questions to ask for
    pub num_questions: usize,
}

impl PromptContext {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn draft(mut self, draft: impl Into<String>) -> Self {
        self.draft = draft.into();
        self
    }

    pub fn transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = transcript.into();
        self
    }

    pub fn num_questions(mut self, n: usize) -> Self {
        self.num_questions = n;
        self
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g. `.patentchat/prompts/`)
    override_dir: Option<PathBuf>,
    /// Candidate instruction documents, primary first
    instructions: InstructionPaths,
}

impl PromptLoader {
    /// Create a new prompt loader
    ///
    /// `root` is where the override directory `.patentchat/prompts/`
    /// is looked for.
    pub fn new(root: impl AsRef<Path>, instructions: InstructionPaths) -> Self {
        let override_dir = root.as_ref().join(".patentchat/prompts");
        let exists = override_dir.exists();
        debug!(?override_dir, %exists, "PromptLoader::new: called");

        Self {
            hbs: Handlebars::new(),
            override_dir: if exists { Some(override_dir) } else { None },
            instructions,
        }
    }

    /// Create a loader that only uses embedded templates (for testing)
    pub fn embedded_only() -> Self {
        Self {
            hbs: Handlebars::new(),
            override_dir: None,
            instructions: InstructionPaths::default(),
        }
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `.patentchat/prompts/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt override {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: using embedded");
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &PromptContext) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// Load the currently active instruction document
    ///
    /// Existence checks run on every call, not once per process, so
    /// swapping the file on disk takes effect immediately: primary
    /// document, then fallback document, then the embedded sample.
    pub fn load_instructions(&self) -> String {
        if self.instructions.primary.exists() {
            if let Ok(text) = std::fs::read_to_string(&self.instructions.primary) {
                info!(path = ?self.instructions.primary, "load_instructions: using primary document");
                return text;
            }
        }
        if self.instructions.fallback.exists() {
            if let Ok(text) = std::fs::read_to_string(&self.instructions.fallback) {
                info!(path = ?self.instructions.fallback, "load_instructions: using fallback document");
                return text;
            }
        }
        debug!("load_instructions: no document on disk, using embedded sample");
        embedded::SAMPLE_INSTRUCTIONS.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_questions_template() {
        let loader = PromptLoader::embedded_only();
        let ctx = PromptContext::new("INSTRUCTION DOC")
            .draft("# Current draft")
            .transcript("Q: Q1\nA: yes")
            .num_questions(5);

        let prompt = loader.render("questions", &ctx).unwrap();
        assert!(prompt.contains("INSTRUCTION DOC"));
        assert!(prompt.contains("# Current draft"));
        assert!(prompt.contains("Q: Q1"));
        assert!(prompt.contains("5 questions"));
    }

    #[test]
    fn test_render_unknown_template() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.render("nonexistent-template", &PromptContext::default()).is_err());
    }

    #[test]
    fn test_override_dir_wins() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".patentchat/prompts");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("title.pmt"), "OVERRIDE {{description}}").unwrap();

        let loader = PromptLoader::new(temp.path(), InstructionPaths::default());
        let prompt = loader
            .render("title", &PromptContext::default().description("idea"))
            .unwrap();
        assert_eq!(prompt, "OVERRIDE idea");
    }

    #[test]
    fn test_instruction_selection_priority() {
        let temp = TempDir::new().unwrap();
        let primary = temp.path().join("primary.md");
        let fallback = temp.path().join("fallback.md");
        let paths = InstructionPaths {
            primary: primary.clone(),
            fallback: fallback.clone(),
        };
        let loader = PromptLoader::new(temp.path(), paths);

        // Nothing on disk: embedded sample
        assert!(loader.load_instructions().contains("Draft claims"));

        // Fallback only
        std::fs::write(&fallback, "FALLBACK DOC").unwrap();
        assert_eq!(loader.load_instructions(), "FALLBACK DOC");

        // Primary appears later without restarting: it wins
        std::fs::write(&primary, "PRIMARY DOC").unwrap();
        assert_eq!(loader.load_instructions(), "PRIMARY DOC");

        // And disappearing again reverts to the fallback
        std::fs::remove_file(&primary).unwrap();
        assert_eq!(loader.load_instructions(), "FALLBACK DOC");
    }
}

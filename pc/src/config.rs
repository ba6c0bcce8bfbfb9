//! Configuration types and loading
//!
//! YAML config file with env-var overrides for the model surface.
//! The API credential is read from the environment at call time; its
//! absence routes model calls to the failure path instead of failing
//! startup.

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Default capable model (draft and question generation)
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Default fast model (title generation)
pub const DEFAULT_TITLE_MODEL: &str = "gemini-2.5-flash";

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model/provider settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Instruction document locations
    #[serde(default)]
    pub instructions: InstructionPaths,

    /// Path to the ideas.json file
    #[serde(default = "default_ideas_path")]
    pub ideas_path: PathBuf,
}

/// Candidate instruction documents, checked in order at every engine
/// call (primary first), so the active document can be swapped
/// without a restart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionPaths {
    #[serde(default = "default_primary_instructions")]
    pub primary: PathBuf,

    #[serde(default = "default_fallback_instructions")]
    pub fallback: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Capable model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Fast model identifier (titles)
    #[serde(default = "default_title_model")]
    pub title_model: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Upper bound on generated tokens per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_title_model() -> String {
    DEFAULT_TITLE_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    300_000
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_primary_instructions() -> PathBuf {
    PathBuf::from("drafting_instructions.md")
}

fn default_fallback_instructions() -> PathBuf {
    PathBuf::from("sample.md")
}

fn default_ideas_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("patentchat")
        .join("ideas.json")
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            title_model: default_title_model(),
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Default for InstructionPaths {
    fn default() -> Self {
        Self {
            primary: default_primary_instructions(),
            fallback: default_fallback_instructions(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            instructions: InstructionPaths::default(),
            ideas_path: default_ideas_path(),
        }
    }
}

impl LlmConfig {
    /// Apply environment overrides on top of the file values
    ///
    /// `GEMINI_MODEL` overrides the capable model, `GEMINI_TITLE_MODEL`
    /// the fast one.
    pub fn resolve(mut self) -> Self {
        if let Ok(model) = std::env::var("GEMINI_MODEL")
            && !model.is_empty()
        {
            debug!(%model, "LlmConfig::resolve: GEMINI_MODEL override");
            self.model = model;
        }
        if let Ok(model) = std::env::var("GEMINI_TITLE_MODEL")
            && !model.is_empty()
        {
            debug!(%model, "LlmConfig::resolve: GEMINI_TITLE_MODEL override");
            self.title_model = model;
        }
        self
    }

    /// Read the API credential from the environment
    ///
    /// Returns None when unset; clients then fail per-call with
    /// `LlmError::MissingApiKey` rather than at construction.
    pub fn api_key(&self) -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty()))
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            return Ok(config);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("patentchat").join("config.yml")),
            Some(PathBuf::from("patentchat.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let config: Config = serde_yaml::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Config::default())
    }
}

//! Whole-file JSON persistence for idea records
//!
//! The collection lives in a single `ideas.json` file wrapped in an
//! `{ "ideas": [...] }` object. Every read loads the full collection
//! and every write replaces it; there are no partial updates.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::Idea;

/// Failed id lookups
///
/// A prefix matching several records is reported as ambiguous, not
/// as missing, so the caller can tell the user to type more of the id.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Idea not found: {0}")]
    NotFound(String),

    #[error("Idea id prefix '{prefix}' is ambiguous ({count} matches); use a longer prefix")]
    Ambiguous { prefix: String, count: usize },
}

/// On-disk wrapper object
#[derive(Debug, Serialize, Deserialize)]
struct IdeasFile {
    ideas: Vec<Idea>,
}

/// Load-all/save-all store for `Idea` records
pub struct IdeaStore {
    /// Path to the ideas.json file
    path: PathBuf,
}

impl IdeaStore {
    /// Open a store at the given file path, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create store directory")?;
        }
        debug!(?path, "Opened idea store");
        Ok(Self { path })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full collection
    ///
    /// A missing file reads as an empty collection; a corrupt or
    /// unreadable file is a persistence failure and propagates.
    pub fn load(&self) -> Result<Vec<Idea>> {
        if !self.path.exists() {
            debug!(path = ?self.path, "load: no ideas file yet, returning empty collection");
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .context(format!("Failed to read ideas file: {}", self.path.display()))?;
        let file: IdeasFile = serde_json::from_str(&raw)
            .context(format!("Failed to parse ideas file: {}", self.path.display()))?;
        debug!(count = file.ideas.len(), "load: loaded ideas");
        Ok(file.ideas)
    }

    /// Replace the full collection on disk
    pub fn save(&self, ideas: &[Idea]) -> Result<()> {
        let payload = IdeasFile { ideas: ideas.to_vec() };
        let content = serde_json::to_string_pretty(&payload)?;
        fs::write(&self.path, content)
            .context(format!("Failed to write ideas file: {}", self.path.display()))?;
        info!(count = ideas.len(), path = ?self.path, "Saved ideas");
        Ok(())
    }
}

/// Position of the record matching an exact id or unique id prefix
fn find_position(ideas: &[Idea], id: &str) -> Result<usize, LookupError> {
    if let Some(pos) = ideas.iter().position(|i| i.id == id) {
        return Ok(pos);
    }
    let hits: Vec<usize> = ideas
        .iter()
        .enumerate()
        .filter(|(_, i)| i.id.starts_with(id))
        .map(|(pos, _)| pos)
        .collect();
    match hits.as_slice() {
        [pos] => Ok(*pos),
        [] => Err(LookupError::NotFound(id.to_string())),
        _ => Err(LookupError::Ambiguous {
            prefix: id.to_string(),
            count: hits.len(),
        }),
    }
}

/// Find an idea by exact id or unique id prefix
pub fn find_idea<'a>(ideas: &'a [Idea], id: &str) -> Result<&'a Idea, LookupError> {
    find_position(ideas, id).map(|pos| &ideas[pos])
}

/// Mutable variant of [`find_idea`]
pub fn find_idea_mut<'a>(ideas: &'a mut [Idea], id: &str) -> Result<&'a mut Idea, LookupError> {
    let pos = find_position(ideas, id)?;
    Ok(&mut ideas[pos])
}

/// Remove an idea by id; returns true if a record was removed
pub fn delete_idea(ideas: &mut Vec<Idea>, id: &str) -> bool {
    let before = ideas.len();
    ideas.retain(|i| i.id != id);
    let removed = ideas.len() != before;
    if removed {
        info!(id, "Deleted idea");
    }
    removed
}

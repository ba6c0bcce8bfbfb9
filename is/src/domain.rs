//! Idea domain types
//!
//! An `Idea` is the top-level persisted unit: one patent concept, its
//! evolving draft, and the ordered Q&A history used to regenerate the
//! draft. The conversation is an append-only audit log: turns are
//! never reordered or deleted, and an answer is written exactly once.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Errors from conversation operations
///
/// These signal a bug in the caller's sequencing, not a user error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("Turn index {index} out of range (conversation has {len} turns)")]
    OutOfRange { index: usize, len: usize },

    #[error("Turn {index} is already answered")]
    AlreadyAnswered { index: usize },

    #[error("An answer must be yes or no")]
    NotAnAnswer,
}

/// Answer to a yes/no interview question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Yes,
    No,
    /// Question posed but not yet answered; transient, excluded from
    /// regeneration transcripts
    #[default]
    Unanswered,
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yes => write!(f, "yes"),
            Self::No => write!(f, "no"),
            Self::Unanswered => write!(f, "unanswered"),
        }
    }
}

impl std::str::FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yes" | "y" => Ok(Self::Yes),
            "no" | "n" => Ok(Self::No),
            _ => Err(format!("Unknown answer: '{}'. Use: yes or no", s)),
        }
    }
}

/// One question/answer pair in the guided interview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Text of the yes/no question posed to the user
    pub question: String,

    /// The recorded answer
    #[serde(default)]
    pub answer: Answer,
}

impl Turn {
    /// Create a new pending turn
    pub fn pending(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: Answer::Unanswered,
        }
    }

    /// Whether this turn has a yes/no answer recorded
    pub fn is_answered(&self) -> bool {
        self.answer != Answer::Unanswered
    }
}

/// The top-level persisted record for one patent concept
///
/// Field names are part of the on-disk format and must stay stable
/// for backward-compatible reads of existing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    /// Unique identifier (uuid v7), assigned at creation
    pub id: String,

    /// Short human-readable label; empty until generated
    #[serde(default)]
    pub title: String,

    /// Free-text classification
    #[serde(default)]
    pub category: String,

    /// The user's raw idea text; immutable once submitted
    pub description: String,

    /// Ordered Q&A history (append-only)
    #[serde(default)]
    pub conversation: Vec<Turn>,

    /// Current full draft text (markdown); empty before bootstrap
    #[serde(default)]
    pub draft: String,

    /// Draft version counter; 0 iff draft is empty
    #[serde(default)]
    pub version: u32,

    /// Creation timestamp (Unix milliseconds)
    #[serde(default)]
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    #[serde(default)]
    pub updated_at: i64,
}

impl Idea {
    /// Create a new empty idea from a raw description
    pub fn new(description: impl Into<String>, category: impl Into<String>) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: Uuid::now_v7().to_string(),
            title: String::new(),
            category: category.into(),
            description: description.into(),
            conversation: Vec::new(),
            draft: String::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a new pending turn to the conversation
    pub fn add_turn(&mut self, question: impl Into<String>) {
        let question = question.into();
        debug!(id = %self.id, turns = self.conversation.len(), "add_turn: appending pending turn");
        self.conversation.push(Turn::pending(question));
        self.touch();
    }

    /// Record the answer for a pending turn
    ///
    /// The conversation is an audit log, not an editable form: the
    /// first recorded answer wins and re-answering is rejected.
    pub fn answer_turn(&mut self, index: usize, answer: Answer) -> Result<(), TurnError> {
        debug!(id = %self.id, index, %answer, "answer_turn: called");
        if answer == Answer::Unanswered {
            return Err(TurnError::NotAnAnswer);
        }
        let len = self.conversation.len();
        let turn = self
            .conversation
            .get_mut(index)
            .ok_or(TurnError::OutOfRange { index, len })?;
        if turn.is_answered() {
            return Err(TurnError::AlreadyAnswered { index });
        }
        turn.answer = answer;
        self.touch();
        Ok(())
    }

    /// Replace the draft text and bump the version counter
    ///
    /// Bootstrap takes an empty idea to version 1; every regeneration
    /// increments from there.
    pub fn apply_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
        self.version += 1;
        debug!(id = %self.id, version = self.version, draft_len = self.draft.len(), "apply_draft: applied");
        self.touch();
    }

    /// Turns with a recorded yes/no answer, in conversation order
    pub fn answered_turns(&self) -> impl Iterator<Item = &Turn> {
        self.conversation.iter().filter(|t| t.is_answered())
    }

    /// Questions still awaiting an answer, with their turn indices
    pub fn pending_questions(&self) -> Vec<(usize, &str)> {
        self.conversation
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_answered())
            .map(|(i, t)| (i, t.question.as_str()))
            .collect()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().timestamp_millis();
    }
}

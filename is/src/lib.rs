//! IdeaStore - durable persistence for patent idea records
//!
//! Stores the full collection of `Idea` records as a single JSON file
//! with load-all/save-all semantics. No partial transactions, no
//! locking: the design assumes a single caller per idea at a time and
//! the last writer to persist wins.
//!
//! # Architecture
//!
//! ```text
//! {data_dir}/
//! └── ideas.json      # { "ideas": [ {id, title, category, ...}, ... ] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use ideastore::{Idea, IdeaStore};
//!
//! let store = IdeaStore::open("data/ideas.json")?;
//! let mut ideas = store.load()?;
//! ideas.push(Idea::new("A folding bicycle frame with a magnetic lock", ""));
//! store.save(&ideas)?;
//! ```

pub mod cli;
pub mod config;
mod domain;
mod store;

pub use domain::{Answer, Idea, Turn, TurnError};
pub use store::{IdeaStore, LookupError, delete_idea, find_idea, find_idea_mut};

/// File name of the persisted collection
pub const IDEAS_FILE: &str = "ideas.json";

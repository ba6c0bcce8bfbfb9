//! Draft engine
//!
//! The regeneration cycle at the core of PatentChat: given an idea,
//! the active instruction document, and a model client, each
//! operation computes the next prompt and the value to fold back into
//! the idea record. Model failures never escape this layer; every
//! operation degrades to its documented fallback value.

mod draft;

pub use draft::{DEFAULT_QUESTION_COUNT, DraftEngine, EngineError, MAX_QUESTIONS};

//! Follow-up handling
//!
//! Classifies a follow-up utterance on an existing plan, answers questions
//! from the plan as-is, and routes modification requests to exactly one
//! pipeline stage, merging the result and appending a new plan version.

mod classifier;
mod engine;
mod qa;

pub use classifier::{Category, Classification, FollowUpAction, Intent, classify};
pub use engine::{FollowUpEngine, FollowUpKind, FollowUpOutcome, chat_reply};
pub use qa::answer;

//! Persisted conversation around pipeline runs.
//!
//! A [`Conversation`] records the user's instructions, a live status
//! placeholder while a run is in flight, the run's step summary and the
//! produced change. [`ConversationStore`] keeps one JSON file per document.

mod state;
mod store;

pub use state::{
    AnalysisStatus, CodeSummary, Conversation, ConversationMessage, MessageContent, MessageRole,
    StepSummary,
};
pub use store::{storage_key, ConversationStore, GLOBAL_KEY};

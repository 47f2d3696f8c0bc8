//! Core domain types for Seditor

mod change;
mod document;
mod result;
mod step;

pub use change::{CodeEditOperation, PendingChange};
pub use document::{count_lines, Instruction, Language, SourceDocument};
pub use result::RunResult;
pub use step::Step;

use serde::{Deserialize, Serialize};

use super::{PendingChange, Step};

/// Terminal outcome of a pipeline run.
///
/// A run that could not produce a usable document still returns a
/// `RunResult`; its `change` is empty and `summary`/`notes` say why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Ordered audit log, one entry per executed (or skipped) stage
    pub steps: Vec<Step>,
    /// Single-line summary suitable for list views
    pub summary: String,
    pub notes: Vec<String>,
    pub change: PendingChange,
    pub explanation: String,
    /// The produced document as a fenced block, when one was extracted
    pub code_block: Option<String>,
}

impl RunResult {
    /// `true` when the run produced something to apply
    pub fn has_change(&self) -> bool {
        !self.change.is_empty()
    }

    /// Find the steps carrying a given title
    pub fn steps_titled<'a>(&'a self, title: &'a str) -> impl Iterator<Item = &'a Step> + 'a {
        self.steps.iter().filter(move |s| s.title == title)
    }
}

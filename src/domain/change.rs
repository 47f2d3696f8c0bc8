use serde::{Deserialize, Serialize};

/// Replace lines `start_line..=end_line` (1-indexed) with `replacement`.
///
/// When `end_line < start_line` the replacement is inserted before
/// `start_line` instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeEditOperation {
    pub start_line: usize,
    pub end_line: usize,
    pub replacement: String,
}

impl CodeEditOperation {
    pub fn new(start_line: usize, end_line: usize, replacement: impl Into<String>) -> Self {
        Self {
            start_line,
            end_line,
            replacement: replacement.into(),
        }
    }
}

/// A proposed document mutation.
///
/// The pipeline only ever fills `full_content`; the edit-list form is kept so
/// incremental strategies (and older persisted conversations) can be applied
/// through the same contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingChange {
    #[serde(default)]
    pub edits: Vec<CodeEditOperation>,
    #[serde(
        rename = "fullContent",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub full_content: Option<String>,
}

impl PendingChange {
    /// A change that replaces the whole document
    pub fn full(content: impl Into<String>) -> Self {
        Self {
            edits: Vec::new(),
            full_content: Some(content.into()),
        }
    }

    pub fn from_edits(edits: Vec<CodeEditOperation>) -> Self {
        Self {
            edits,
            full_content: None,
        }
    }

    /// `true` when applying this change would be a no-op
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && self.full_content.is_none()
    }

    /// Apply the change to `content` and return the new document text.
    ///
    /// Full replacement wins over edits. Edits are applied bottom-up (by
    /// descending start line) so earlier line numbers stay meaningful, and
    /// every range is clamped to the current document bounds.
    pub fn apply_to(&self, content: &str) -> String {
        if let Some(full) = &self.full_content {
            return full.clone();
        }
        if self.edits.is_empty() {
            return content.to_string();
        }

        let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
        let mut sorted: Vec<&CodeEditOperation> = self.edits.iter().collect();
        sorted.sort_by(|a, b| b.start_line.cmp(&a.start_line));

        for edit in sorted {
            let len = lines.len();
            let start = edit.start_line.clamp(1, len + 1);
            let end = edit.end_line.max(start - 1).min(len);
            let replacement: Vec<String> = if edit.replacement.is_empty() {
                Vec::new()
            } else {
                edit.replacement.split('\n').map(str::to_string).collect()
            };

            if end >= start {
                lines.splice(start - 1..end, replacement);
            } else {
                let at = (start - 1).min(len);
                lines.splice(at..at, replacement);
            }
        }

        lines.join("\n")
    }
}

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CodeEditOperation, Instruction, PendingChange, RunResult, Step};

const PREPARING_STATUS: &str = "Preparing initial analysis...";
const APPLIED_TEXT: &str = "The change has been applied to the file.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Assistant,
    User,
}

/// Live progress of an in-flight run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStatus {
    pub started_at: DateTime<Utc>,
    pub current_step: String,
}

/// Audit log of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSummary {
    pub steps: Vec<Step>,
    pub summary_text: String,
    #[serde(default)]
    pub notes: Vec<String>,
    /// Seconds
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub code_applied: bool,
}

/// A change produced by a run, applied or not
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSummary {
    pub change: PendingChange,
    #[serde(default)]
    pub applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_block: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
    Text { text: String },
    AnalysisStatus { status: AnalysisStatus },
    Steps { summary: StepSummary },
    Code { code: CodeSummary },
    /// Content written by a newer version
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: MessageContent,
}

impl ConversationMessage {
    pub fn new(role: MessageRole, content: MessageContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
        }
    }

    pub fn text(role: MessageRole, text: impl Into<String>) -> Self {
        Self::new(role, MessageContent::Text { text: text.into() })
    }
}

/// Message history for one document plus the change awaiting apply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredConversation", into = "StoredConversation")]
pub struct Conversation {
    pub messages: Vec<ConversationMessage>,
    pub pending_change: Option<PendingChange>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the instruction and a status placeholder; returns the
    /// placeholder id used by the other run operations.
    pub fn begin_run(&mut self, instruction: &Instruction) -> Uuid {
        self.messages
            .push(ConversationMessage::text(MessageRole::User, instruction.as_str()));
        let placeholder = ConversationMessage::new(
            MessageRole::Assistant,
            MessageContent::AnalysisStatus {
                status: AnalysisStatus {
                    started_at: Utc::now(),
                    current_step: PREPARING_STATUS.to_string(),
                },
            },
        );
        let id = placeholder.id;
        self.messages.push(placeholder);
        id
    }

    /// Update the placeholder's current step. Returns `false` once the
    /// placeholder has been replaced.
    pub fn update_status(&mut self, id: Uuid, label: &str) -> bool {
        match self.find_mut(id).map(|m| &mut m.content) {
            Some(MessageContent::AnalysisStatus { status }) => {
                status.current_step = label.to_string();
                true
            }
            _ => false,
        }
    }

    /// Replace the placeholder with the run's step summary and, when the run
    /// produced a change, append it as a code message.
    ///
    /// Only the first completion of a placeholder has any effect.
    pub fn complete_run(&mut self, id: Uuid, result: &RunResult, duration: Duration) -> bool {
        let Some(message) = self.find_mut(id) else {
            return false;
        };
        if !matches!(message.content, MessageContent::AnalysisStatus { .. }) {
            return false;
        }

        message.content = MessageContent::Steps {
            summary: StepSummary {
                steps: result.steps.clone(),
                summary_text: result.summary.clone(),
                notes: result.notes.clone(),
                duration: duration.as_secs_f64(),
                code_applied: false,
            },
        };

        if result.has_change() {
            let explanation = result.explanation.trim();
            self.messages.push(ConversationMessage::new(
                MessageRole::Assistant,
                MessageContent::Code {
                    code: CodeSummary {
                        change: result.change.clone(),
                        applied: false,
                        code_block: result.code_block.clone(),
                        explanation: (!explanation.is_empty()).then(|| explanation.to_string()),
                    },
                },
            ));
            self.pending_change = Some(result.change.clone());
        } else {
            self.pending_change = None;
        }
        true
    }

    /// Replace the placeholder with a failure note. The pending change is
    /// left as it was.
    pub fn fail_run(&mut self, id: Uuid, error: &str) {
        let text = format!("Completion request failed: {}", error);
        let placeholder = self.messages.iter().position(|m| {
            m.id == id && matches!(m.content, MessageContent::AnalysisStatus { .. })
        });
        match placeholder {
            Some(index) => self.messages[index].content = MessageContent::Text { text },
            None => self
                .messages
                .push(ConversationMessage::text(MessageRole::Assistant, text)),
        }
    }

    /// The change an apply would use: the explicit pending change, else the
    /// newest unapplied code message.
    pub fn current_change(&self) -> Option<&PendingChange> {
        self.pending_change
            .as_ref()
            .filter(|c| !c.is_empty())
            .or_else(|| self.inferred_pending_change())
    }

    /// Newest code message that has not been applied yet
    pub fn inferred_pending_change(&self) -> Option<&PendingChange> {
        self.messages.iter().rev().find_map(|m| match &m.content {
            MessageContent::Code { code } if !code.applied => Some(&code.change),
            _ => None,
        })
    }

    /// Flag the newest unapplied code message and its step summary as
    /// applied, clear the pending change and note it in the history.
    pub fn mark_applied(&mut self) -> bool {
        let Some(code_index) = self.messages.iter().rposition(|m| {
            matches!(&m.content, MessageContent::Code { code } if !code.applied)
        }) else {
            return false;
        };

        if let MessageContent::Code { code } = &mut self.messages[code_index].content {
            code.applied = true;
        }
        for message in self.messages[..code_index].iter_mut().rev() {
            match &mut message.content {
                MessageContent::Steps { summary } => {
                    summary.code_applied = true;
                    break;
                }
                MessageContent::Code { .. } => continue,
                _ => break,
            }
        }

        self.pending_change = None;
        self.messages
            .push(ConversationMessage::text(MessageRole::Assistant, APPLIED_TEXT));
        true
    }

    fn find_mut(&mut self, id: Uuid) -> Option<&mut ConversationMessage> {
        self.messages.iter_mut().find(|m| m.id == id)
    }
}

/// On-disk shape. `pendingEdits` is the older encoding of a pending change
/// and is only read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredConversation {
    messages: Vec<ConversationMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pending_change: Option<PendingChange>,
    #[serde(default, skip_serializing)]
    pending_edits: Option<Vec<CodeEditOperation>>,
}

impl From<StoredConversation> for Conversation {
    fn from(stored: StoredConversation) -> Self {
        let pending_change = stored.pending_change.or_else(|| {
            stored
                .pending_edits
                .filter(|edits| !edits.is_empty())
                .map(PendingChange::from_edits)
        });
        Self {
            messages: stored.messages,
            pending_change,
        }
    }
}

impl From<Conversation> for StoredConversation {
    fn from(conversation: Conversation) -> Self {
        let pending_change = conversation
            .current_change()
            .filter(|c| !c.is_empty())
            .cloned();
        Self {
            messages: conversation.messages,
            pending_change,
            pending_edits: None,
        }
    }
}

//! Completion service trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Speaker of a prior conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// A prior turn that may be sent along with a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Sampling options forwarded with every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.4,
            top_p: 0.95,
        }
    }
}

/// Failure reported by a completion service.
///
/// The display text is surfaced to the user verbatim when a run aborts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("API key not found; set it in the environment before running")]
    MissingApiKey,

    #[error("Request was not authorized: {0}")]
    Unauthorized(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("No text was received from the model")]
    EmptyResponse,
}

/// Trait for completion backends
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Generate a completion for `prompt`.
    ///
    /// # Arguments
    /// * `prompt` - The full, self-contained prompt text
    /// * `prior_turns` - Earlier conversation turns; the pipeline always passes none
    /// * `options` - Model and sampling options
    async fn generate(
        &self,
        prompt: &str,
        prior_turns: &[Message],
        options: &GenerationOptions,
    ) -> Result<String, ServiceError>;

    /// Get the backend ID
    fn id(&self) -> &str;
}

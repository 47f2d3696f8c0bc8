//! Wire types for the `generateContent` endpoint.

use serde::{Deserialize, Serialize};

use crate::agent::{Message, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl From<&Message> for Content {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            parts: vec![Part {
                text: message.text.clone(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    /// Build the request body; the prompt becomes the final user turn unless
    /// the prior turns already end with one.
    pub fn new(prompt: &str, prior_turns: &[Message], temperature: f64, top_p: f64) -> Self {
        let mut contents: Vec<Content> = prior_turns.iter().map(Content::from).collect();
        if prior_turns.last().map(|m| m.role) != Some(Role::User) {
            contents.push(Content::from(&Message::user(prompt)));
        }
        Self {
            contents,
            generation_config: GenerationConfig { temperature, top_p },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate
    pub fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()
            .map(|p| p.text)
    }
}

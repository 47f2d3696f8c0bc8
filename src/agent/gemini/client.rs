//! HTTP client for the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use std::time::Duration;

use crate::agent::{CompletionService, GenerationOptions, Message, ServiceError};

use super::types::{GenerateRequest, GenerateResponse};

/// Default Generative Language API base URL
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

fn encode_url_path_segment(segment: &str) -> String {
    // RFC3986 unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"
    let mut out = String::with_capacity(segment.len());
    for &b in segment.as_bytes() {
        let is_unreserved =
            matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~');
        if is_unreserved {
            out.push(b as char);
        } else {
            out.push('%');
            out.push_str(&format!("{:02X}", b));
        }
    }
    out
}

/// Completion backend backed by the Gemini REST API
#[derive(Clone)]
pub struct GeminiClient {
    id: String,
    base_url: String,
    api_key: Option<String>,
    client: ureq::Agent,
}

impl GeminiClient {
    /// Create a client against the public endpoint
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_url(DEFAULT_GEMINI_URL, api_key)
    }

    /// Create a client with a custom base URL
    pub fn with_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(300))
            .build();

        Self {
            id: "gemini".to_string(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url,
            encode_url_path_segment(model)
        )
    }

    fn call(
        client: &ureq::Agent,
        url: &str,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<String, ServiceError> {
        let response = match client.post(url).query("key", api_key).send_json(request) {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = response
                    .into_string()
                    .unwrap_or_else(|_| format!("Status: {}", code));
                return Err(if code == 401 || code == 403 {
                    ServiceError::Unauthorized(body)
                } else {
                    ServiceError::RequestFailed(body)
                });
            }
            Err(ureq::Error::Transport(t)) => {
                return Err(ServiceError::Transport(t.to_string()));
            }
        };

        let decoded: GenerateResponse = response
            .into_json()
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

        decoded.first_text().ok_or(ServiceError::EmptyResponse)
    }
}

#[async_trait]
impl CompletionService for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        prior_turns: &[Message],
        options: &GenerationOptions,
    ) -> Result<String, ServiceError> {
        let Some(api_key) = self.api_key.clone() else {
            return Err(ServiceError::MissingApiKey);
        };

        let url = self.endpoint(&options.model);
        let request = GenerateRequest::new(prompt, prior_turns, options.temperature, options.top_p);
        let client = self.client.clone();

        tracing::debug!(model = %options.model, prompt_chars = prompt.len(), "gemini request");

        tokio::task::spawn_blocking(move || Self::call(&client, &url, &api_key, &request))
            .await
            .map_err(|e| ServiceError::Transport(format!("request task failed: {}", e)))?
    }

    fn id(&self) -> &str {
        &self.id
    }
}

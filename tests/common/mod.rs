//! Shared test utilities for pipeline integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use seditor::agent::{CompletionService, GenerationOptions, Message, ServiceError};
use seditor::{Language, SourceDocument};

/// One request seen by a [`ScriptedService`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub prior_turns: usize,
    pub options: GenerationOptions,
}

type Responder = Box<dyn Fn(&str) -> Result<String, ServiceError> + Send + Sync>;

enum Script {
    Queue(Mutex<VecDeque<Result<String, ServiceError>>>),
    Responder(Responder),
}

/// Completion service that answers from a fixed script and records every call
pub struct ScriptedService {
    script: Script,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedService {
    /// Answer calls in order; an exhausted script fails the request
    pub fn new(responses: Vec<Result<String, ServiceError>>) -> Self {
        Self {
            script: Script::Queue(Mutex::new(responses.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(responses: &[&str]) -> Self {
        Self::new(responses.iter().map(|r| Ok(r.to_string())).collect())
    }

    /// Answer each call by looking at its prompt
    pub fn responder(
        f: impl Fn(&str) -> Result<String, ServiceError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Script::Responder(Box::new(f)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.prompt).collect()
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    async fn generate(
        &self,
        prompt: &str,
        prior_turns: &[Message],
        options: &GenerationOptions,
    ) -> Result<String, ServiceError> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            prior_turns: prior_turns.len(),
            options: options.clone(),
        });

        match &self.script {
            Script::Queue(queue) => queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ServiceError::RequestFailed("script exhausted".into()))),
            Script::Responder(f) => f(prompt),
        }
    }

    fn id(&self) -> &str {
        "scripted"
    }
}

/// Which stage a prompt belongs to, judged by its wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Plan,
    ContextAudit,
    Chunk,
    Strategy,
    Generate,
    Repair,
    Explain,
}

pub fn classify(prompt: &str) -> PromptKind {
    if prompt.contains("Write a numbered work plan") {
        PromptKind::Plan
    } else if prompt.contains("Summarize the main structure of the file") {
        PromptKind::ContextAudit
    } else if prompt.contains("Evaluate the code chunk at lines") {
        PromptKind::Chunk
    } else if prompt.contains("Lay out a structured change strategy") {
        PromptKind::Strategy
    } else if prompt.contains("Produce the final, tidy HTML file") {
        PromptKind::Generate
    } else if prompt.contains("The HTML you produced is not valid yet") {
        PromptKind::Repair
    } else if prompt.contains("Explain this code in") {
        PromptKind::Explain
    } else {
        panic!("unrecognized prompt: {}", prompt)
    }
}

pub const PLAN_REPLY: &str = "1. Read the body\n2. Add the footer\nkeep it short";
pub const STRATEGY_REPLY: &str = "- Add a <footer> before </body>";
pub const EXPLANATION_REPLY: &str = "The page now ends with a footer.\nIt keeps the old layout.";

pub const VALID_HTML: &str =
    "<!DOCTYPE html>\n<html>\n<head><title>t</title></head>\n<body>\n<footer>x</footer>\n</body>\n</html>";
pub const INVALID_HTML: &str = "<div>\n<footer>x</footer>\n</div>";

pub fn fenced(code: &str) -> String {
    format!("Here you go:\n```html\n{}\n```\nDone.", code)
}

/// A valid HTML document of exactly `lines` lines (at least 6)
pub fn html_document(lines: usize) -> SourceDocument {
    let lines = lines.max(6);
    let mut out = vec![
        "<!DOCTYPE html>".to_string(),
        "<html>".to_string(),
        "<head><title>t</title></head>".to_string(),
        "<body>".to_string(),
    ];
    for i in 0..lines - 6 {
        out.push(format!("<p>line {}</p>", i));
    }
    out.push("</body>".to_string());
    out.push("</html>".to_string());
    SourceDocument::new("index.html", Language::Html, out.join("\n"))
}

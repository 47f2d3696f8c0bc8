use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::pipeline::PipelineError;

/// Language tag of the document targeted by a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Html,
    Css,
    #[serde(rename = "javascript")]
    JavaScript,
    Plain,
}

impl Language {
    /// Guess the language from a file extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("html") | Some("htm") => Language::Html,
            Some("css") => Language::Css,
            Some("js") | Some("mjs") | Some("cjs") => Language::JavaScript,
            _ => Language::Plain,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::JavaScript => "JavaScript",
            Language::Plain => "Plain Text",
        }
    }

    /// Info string used when fencing content of this language
    pub fn fence_tag(&self) -> &'static str {
        match self {
            Language::Html => "html",
            Language::Css => "css",
            Language::JavaScript => "javascript",
            Language::Plain => "text",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A user edit request, trimmed and guaranteed non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instruction(String);

impl Instruction {
    /// Trim the input and reject it if nothing is left
    pub fn new(text: impl AsRef<str>) -> Result<Self, PipelineError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PipelineError::EmptyInstruction);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Instruction {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The single document a run operates on.
///
/// Immutable for the lifetime of a run; the pipeline only ever proposes a
/// replacement through [`crate::PendingChange`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub name: String,
    pub language: Language,
    pub content: String,
    pub line_count: usize,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, language: Language, content: impl Into<String>) -> Self {
        let content = content.into();
        let line_count = count_lines(&content);
        Self {
            name: name.into(),
            language,
            content,
            line_count,
        }
    }

    /// Read a document from disk, detecting its language from the extension
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, Language::from_path(path), content))
    }
}

/// Number of `\n`-separated lines; empty text has none
pub fn count_lines(text: &str) -> usize {
    if text.is_empty() {
        0
    } else {
        text.split('\n').count()
    }
}

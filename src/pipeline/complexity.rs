//! Heuristic task complexity scoring.
//!
//! The profile decides which optional stages run and how finely the document
//! is chunked. Scoring is additive over instruction length, number of
//! directives, document size and a fixed set of keyword groups.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::{Instruction, SourceDocument};

/// Coarse complexity band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

impl ComplexityLevel {
    /// Band for a heuristic score
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=2 => ComplexityLevel::Low,
            3..=5 => ComplexityLevel::Medium,
            _ => ComplexityLevel::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComplexityLevel::Low => "Low",
            ComplexityLevel::Medium => "Medium",
            ComplexityLevel::High => "High",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ComplexityLevel::Low => "Focused request with a limited scope.",
            ComplexityLevel::Medium => {
                "The change spans several aspects and needs some context tracing."
            }
            ComplexityLevel::High => {
                "Complex instruction that likely touches many parts and needs deep evaluation."
            }
        }
    }

    /// Number of plan steps to ask the model for
    pub fn plan_step_range(&self) -> RangeInclusive<u32> {
        match self {
            ComplexityLevel::Low => 4..=5,
            ComplexityLevel::Medium => 5..=7,
            ComplexityLevel::High => 7..=9,
        }
    }

    /// Lines per chunk during chunk analysis
    pub fn chunk_size(&self) -> usize {
        match self {
            ComplexityLevel::Low => 200,
            ComplexityLevel::Medium => 150,
            ComplexityLevel::High => 110,
        }
    }

    /// How many chunk exchanges are kept verbatim in the step log
    pub fn documented_chunk_limit(&self) -> usize {
        match self {
            ComplexityLevel::Low => 0,
            ComplexityLevel::Medium => 4,
            ComplexityLevel::High => 6,
        }
    }
}

impl std::fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

struct KeywordGroup {
    keywords: &'static [&'static str],
    increment: u32,
    label: &'static str,
}

const KEYWORD_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        keywords: &["refactor", "architecture", "restructure", "arsitektur", "struktur"],
        increment: 2,
        label: "structure & architecture",
    },
    KeywordGroup {
        keywords: &["component", "modular", "reusable", "komponen"],
        increment: 1,
        label: "reusable components",
    },
    KeywordGroup {
        keywords: &["style", "css", "responsive", "gaya"],
        increment: 1,
        label: "visual style",
    },
    KeywordGroup {
        keywords: &["animation", "interaction", "transition", "animasi", "interaksi", "transisi"],
        increment: 1,
        label: "interaction / animation",
    },
    KeywordGroup {
        keywords: &["optimization", "optimize", "performance", "accessibility", "seo", "optimisasi", "aksesibilitas"],
        increment: 2,
        label: "optimization & accessibility",
    },
    KeywordGroup {
        keywords: &["integration", "api", "data", "fetch", "integrasi"],
        increment: 2,
        label: "data integration",
    },
];

/// Heuristic classification of one run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityProfile {
    pub level: ComplexityLevel,
    pub score: u32,
    pub word_count: usize,
    pub directive_count: usize,
    pub file_line_count: usize,
    pub chunk_size: usize,
    pub requires_context_audit: bool,
    pub requires_chunk_analysis: bool,
    pub documented_chunk_limit: usize,
    pub attention_phrases: Vec<String>,
    /// Only meaningful when chunk analysis is skipped
    pub skip_analysis_reason: String,
}

/// Score an instruction against the document it targets.
///
/// Pure: identical inputs always produce an identical profile.
pub fn evaluate(instruction: &Instruction, document: &SourceDocument) -> ComplexityProfile {
    evaluate_text(instruction.as_str(), document.line_count)
}

/// Same as [`evaluate`] over raw values
pub fn evaluate_text(instruction: &str, line_count: usize) -> ComplexityProfile {
    let word_count = instruction.split_whitespace().count();
    let directive_count = instruction
        .split(['.', '!', '?'])
        .filter(|segment| !segment.trim().is_empty())
        .count()
        .max(1);

    let mut score = word_score(word_count) + directive_score(directive_count) + line_score(line_count);

    let lowered = instruction.to_lowercase();
    let mut attention_phrases = Vec::new();
    for group in KEYWORD_GROUPS {
        if group.keywords.iter().any(|k| lowered.contains(k)) {
            score += group.increment;
            attention_phrases.push(group.label.to_string());
        }
    }

    let level = ComplexityLevel::from_score(score);
    let requires_context_audit = level != ComplexityLevel::Low || line_count > 150;
    let requires_chunk_analysis =
        (level != ComplexityLevel::Low && line_count > 40) || line_count > 200;
    let skip_analysis_reason = if requires_chunk_analysis {
        String::new()
    } else {
        format!(
            "the instruction is focused and the {}-line document is easy to read without splitting it into chunks",
            line_count
        )
    };

    ComplexityProfile {
        level,
        score,
        word_count,
        directive_count,
        file_line_count: line_count,
        chunk_size: level.chunk_size(),
        requires_context_audit,
        requires_chunk_analysis,
        documented_chunk_limit: level.documented_chunk_limit(),
        attention_phrases,
        skip_analysis_reason,
    }
}

fn word_score(words: usize) -> u32 {
    if words > 80 {
        3
    } else if words > 50 {
        2
    } else if words > 25 {
        1
    } else {
        0
    }
}

fn directive_score(directives: usize) -> u32 {
    if directives > 4 {
        2
    } else if directives > 2 {
        1
    } else {
        0
    }
}

fn line_score(lines: usize) -> u32 {
    if lines > 220 {
        3
    } else if lines > 140 {
        2
    } else if lines > 70 {
        1
    } else {
        0
    }
}

impl ComplexityProfile {
    /// Attention phrases joined for display, `-` when none matched
    pub fn attention_summary(&self) -> String {
        if self.attention_phrases.is_empty() {
            "-".to_string()
        } else {
            self.attention_phrases.join(", ")
        }
    }

    /// Body of the profile step
    pub fn describe(&self, document: &SourceDocument) -> String {
        let stages = [
            "Analysis plan",
            if self.requires_context_audit {
                "Context audit"
            } else {
                "Context audit (skipped)"
            },
            "Structure map",
            if self.requires_chunk_analysis {
                "Chunk analysis"
            } else {
                "Chunk analysis (skipped)"
            },
            "Change strategy",
            "Code generation",
            "Structure validation",
            "Explanation",
        ]
        .join(" → ");

        format!(
            "Complexity level: {} (heuristic score {}).\n{}\nInstruction length: {} words in {} directives.\nActive document: {} lines ({}).\nDetected focus: {}\nExecution stages: {}",
            self.level.label(),
            self.score,
            self.level.description(),
            self.word_count,
            self.directive_count,
            self.file_line_count,
            document.language.display_name(),
            self.attention_summary(),
            stages
        )
    }
}

//! Prompt templates for each pipeline stage.
//!
//! Every builder is pure and produces one self-contained prompt: earlier
//! stages are carried forward only as text, never as conversation history.
//! The complexity level tunes requested verbosity but not the structure.

use crate::{Instruction, SourceDocument};

use super::chunk::Chunk;
use super::complexity::{ComplexityLevel, ComplexityProfile};
use super::validate::ValidationResult;

/// Characters of the original document shown to the generation stage
pub const GENERATION_SNAPSHOT_CHARS: usize = 8000;
/// Characters of invalid code shown to the repair stage
pub const REPAIR_CODE_CHARS: usize = 6000;

const CONTEXT_DOCUMENT_CHARS: usize = 6000;
const CHUNK_CONTEXT_CHARS: usize = 1200;
const CHUNK_TEXT_CHARS: usize = 1500;
const STRATEGY_SECTION_CHARS: usize = 2000;
const GENERATION_PLAN_CHARS: usize = 2500;
const GENERATION_SECTION_CHARS: usize = 2000;
const EXPLANATION_PLAN_CHARS: usize = 1500;
const EXPLANATION_CODE_CHARS: usize = 4000;

/// Shorten `text` to about `limit` characters, keeping its head and tail.
///
/// Text within the limit is returned unchanged. Otherwise the tail keeps
/// `min(400, limit / 3)` characters and the head fills the rest, minus room
/// for the `\n...\n` separator.
pub fn truncate_for_prompt(text: &str, limit: usize) -> String {
    let total = text.chars().count();
    if total <= limit {
        return text.to_string();
    }

    let suffix_len = (limit / 3).min(400);
    let prefix_len = limit.saturating_sub(suffix_len + 5);
    let prefix: String = text.chars().take(prefix_len).collect();
    let suffix: String = text.chars().skip(total - suffix_len).collect();
    format!("{}\n...\n{}", prefix, suffix)
}

/// Head-and-tail snapshot of a document, split evenly.
pub fn context_snapshot(content: &str, max_chars: usize) -> String {
    let total = content.chars().count();
    if total <= max_chars {
        return content.to_string();
    }

    let prefix_len = max_chars / 2;
    let suffix_len = max_chars - prefix_len;
    let prefix: String = content.chars().take(prefix_len).collect();
    let suffix: String = content.chars().skip(total - suffix_len).collect();
    format!("{}\n...\n{}", prefix, suffix)
}

fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() { "-" } else { text }
}

/// Plan stage: ask for a numbered, chronological work plan.
pub fn plan_prompt(
    instruction: &Instruction,
    document: &SourceDocument,
    profile: &ComplexityProfile,
) -> String {
    let range = profile.level.plan_step_range();
    let attention = if profile.attention_phrases.is_empty() {
        "Stay focused on the end result the user asked for.".to_string()
    } else {
        format!(
            "Pay special attention to: {}.",
            profile.attention_phrases.join(", ")
        )
    };

    format!(
        r#"You are an advanced coding assistant. The user's instruction:
"{instruction}"

Task profile:
- Complexity level: {level} (score {score}).
- Active file: {name} ({lines} lines, language {language}).
- Main focus: {attention}

Write a numbered work plan of {min}-{max} steps and scale the number of steps to the difficulty of the task.
Every step must explain:
• Its specific goal.
• The code area to review (function, component, or range of lines).
• Checks or risks to watch for.

Keep the plan chronological and ready to execute in the next stage."#,
        instruction = instruction,
        level = profile.level.label(),
        score = profile.score,
        name = document.name,
        lines = document.line_count,
        language = document.language.display_name(),
        attention = attention,
        min = range.start(),
        max = range.end(),
    )
}

/// Context audit stage: summarize the document against the plan.
pub fn context_audit_prompt(
    instruction: &Instruction,
    document: &SourceDocument,
    plan_outline: &str,
) -> String {
    let plan = if plan_outline.trim().is_empty() {
        "No plan is available yet; rely on your understanding of the instruction."
    } else {
        plan_outline
    };

    format!(
        r#"User instruction:
"{instruction}"

Current analysis plan:
{plan}

Contents of {name} (trimmed to fit):
```{fence}
{content}
```

Your task:
1. Summarize the main structure of the file and the parts that matter for the instruction.
2. Identify the areas likely to be affected by the change (name lines or structural markers).
3. Highlight risks or dependencies that must be preserved.

Answer concisely but informatively."#,
        instruction = instruction,
        plan = plan,
        name = document.name,
        fence = document.language.fence_tag(),
        content = truncate_for_prompt(&document.content, CONTEXT_DOCUMENT_CHARS),
    )
}

/// Placeholder context used when the audit stage is gated off
pub fn skipped_audit_summary(first_plan_item: Option<&str>) -> String {
    format!(
        "The instruction is simple enough that a deep context audit was skipped. Focus on {}.",
        first_plan_item.unwrap_or("the main goal stated by the user")
    )
}

/// Chunk analysis stage: judge one chunk's relevance without proposing code.
pub fn chunk_prompt(
    instruction: &Instruction,
    chunk: &Chunk,
    plan_outline: &str,
    context_summary: &str,
) -> String {
    format!(
        r#"User instruction:
"{instruction}"

Analysis plan:
{plan}

Context summary (trimmed):
{context}

Evaluate the code chunk at lines {start}-{end}:
{text}

Your task:
1. Explain whether this chunk is relevant to the instruction.
2. If it is relevant, name the parts that must change and why.
3. If it is not relevant, answer briefly "Not relevant because ..." (one sentence at most).
4. Do not propose code changes at this stage, only analysis."#,
        instruction = instruction,
        plan = or_dash(plan_outline),
        context = truncate_for_prompt(context_summary, CHUNK_CONTEXT_CHARS),
        start = chunk.start_line,
        end = chunk.end_line,
        text = truncate_for_prompt(&chunk.text, CHUNK_TEXT_CHARS),
    )
}

/// Strategy stage: a bounded list of concrete change points.
pub fn strategy_prompt(
    instruction: &Instruction,
    plan_outline: &str,
    context_summary: &str,
    chunk_detail: &str,
    profile: &ComplexityProfile,
) -> String {
    let max_points = if profile.level == ComplexityLevel::High { 6 } else { 5 };

    format!(
        r#"User instruction:
"{instruction}"

Analysis plan:
{plan}

Context summary:
{context}

Chunk analysis findings:
{chunks}

Lay out a structured change strategy as a bullet list (at most {max_points} points). Every point must cover:
- Its specific goal.
- The affected code area (name lines, HTML elements, or structures).
- Risks or checks to perform after the change."#,
        instruction = instruction,
        plan = or_dash(plan_outline),
        context = truncate_for_prompt(context_summary, STRATEGY_SECTION_CHARS),
        chunks = truncate_for_prompt(chunk_detail, STRATEGY_SECTION_CHARS),
        max_points = max_points,
    )
}

/// Everything the generation stage has learned so far
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    pub instruction: &'a Instruction,
    pub plan_outline: &'a str,
    pub strategy: &'a str,
    pub context_summary: &'a str,
    pub chunk_detail: &'a str,
    pub snapshot: &'a str,
    pub profile: &'a ComplexityProfile,
}

/// Generation stage: produce the full replacement document in one fence.
pub fn generation_prompt(ctx: &GenerationContext<'_>) -> String {
    let completeness = if ctx.profile.level == ComplexityLevel::High {
        "Make sure the final code is production-ready and leaves no placeholders."
    } else {
        "Make sure the final code runs without errors."
    };

    format!(
        r#"User instruction:
"{instruction}"

Analysis plan:
{plan}

Change strategy:
{strategy}

Context summary:
{context}

Relevant chunk details:
{chunks}

Here is the file before the change (trimmed):
```html
{snapshot}
```

Produce the final, tidy HTML file that applies the instruction above. Apply the whole strategy, keep the structure consistent, and preserve the parts that do not need to change.
Format the answer as a single Markdown code block labelled ```html with no extra text outside that block. If JavaScript or CSS is needed, include it inside the HTML document. {completeness}"#,
        instruction = ctx.instruction,
        plan = truncate_for_prompt(ctx.plan_outline, GENERATION_PLAN_CHARS),
        strategy = truncate_for_prompt(ctx.strategy, GENERATION_PLAN_CHARS),
        context = truncate_for_prompt(ctx.context_summary, GENERATION_SECTION_CHARS),
        chunks = truncate_for_prompt(ctx.chunk_detail, GENERATION_SECTION_CHARS),
        snapshot = ctx.snapshot,
        completeness = completeness,
    )
}

/// Repair stage: fix the structural issues found by validation.
pub fn repair_prompt(
    instruction: &Instruction,
    invalid_code: &str,
    issues: &[String],
    code_limit: usize,
) -> String {
    let issue_text = if issues.is_empty() {
        "- The basic structure is incomplete.".to_string()
    } else {
        numbered(issues)
    };

    format!(
        r#"The user's instruction:
"{instruction}"

The HTML you produced is not valid yet. Issues found:
{issues}

Here is the code that needs fixing:
```html
{code}
```

Fix the code so that:
1. It contains paired <!DOCTYPE html>, <html>, <head>, and <body> elements.
2. The semantic structure stays tidy and follows the original instruction.
3. Important content from the previous version is not dropped without a clear reason.

Return the final result as a ```html code block with no additional explanation."#,
        instruction = instruction,
        issues = issue_text,
        code = truncate_for_prompt(invalid_code, code_limit),
    )
}

/// Explanation stage: a short prose walkthrough of the final document.
pub fn explanation_prompt(
    code: &str,
    instruction: &Instruction,
    plan_outline: &str,
    profile: &ComplexityProfile,
) -> String {
    let plan = if plan_outline.trim().is_empty() {
        "-".to_string()
    } else {
        truncate_for_prompt(plan_outline, EXPLANATION_PLAN_CHARS)
    };
    let sentences = if profile.level == ComplexityLevel::High {
        "4-5 sentences"
    } else {
        "3-4 sentences"
    };

    format!(
        r#"You have just written the following HTML document:

```html
{code}
```

User instruction:
"{instruction}"

The plan that was drawn up:
{plan}

Explain this code in {sentences} of clear prose. Focus on:
- The page structure and its main sections.
- Important changes compared to the previous version.
- The benefit or effect for the end user.

Avoid bullets, lists, or additional code blocks."#,
        code = truncate_for_prompt(code, EXPLANATION_CODE_CHARS),
        instruction = instruction,
        plan = plan,
        sentences = sentences,
    )
}

/// `1. a\n2. b` rendering shared by issue lists
fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Step body for a prompt/response pair
pub fn format_exchange(prompt: &str, response: &str) -> String {
    format!("Prompt:\n{}\n\nResponse:\n{}", prompt, response)
}

/// Step body for the plan stage: the exchange plus the parsed outline
pub fn format_plan_step(prompt: &str, response: &str, plan_outline: &str) -> String {
    let mut body = format_exchange(prompt, response);
    if !plan_outline.is_empty() {
        body.push_str("\n\nStructured steps:\n");
        body.push_str(plan_outline);
    }
    body
}

/// Step body entry for one analysed chunk
pub fn format_chunk_exchange(chunk: &Chunk, prompt: &str, response: &str) -> String {
    format!(
        "[Chunk {} • Lines {}-{}]\n{}",
        chunk.index + 1,
        chunk.start_line,
        chunk.end_line,
        format_exchange(prompt, response)
    )
}

/// Step body for a validation pass
pub fn describe_validation(result: &ValidationResult) -> String {
    if result.is_valid {
        return "The HTML structure contains all required elements (doctype, html, head, body)."
            .to_string();
    }
    format!(
        "The HTML structure is not valid yet. Findings:\n{}",
        numbered(&result.issues)
    )
}

/// Step body for the structure map stage
pub fn structure_summary(
    document: &SourceDocument,
    chunk_size: usize,
    chunk_count: usize,
    profile: &ComplexityProfile,
) -> String {
    format!(
        "File structure:\n• Total lines: {}\n• Evaluation chunks: {} (at most {} lines per chunk)\n• Dominant language: {}\n• Complexity profile: {}",
        document.line_count,
        chunk_count,
        chunk_size,
        document.language.display_name(),
        profile.level.label()
    )
}

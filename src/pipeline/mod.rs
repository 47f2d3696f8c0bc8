//! Staged edit pipeline.
//!
//! [`PipelineRunner`] turns an [`Instruction`] and one [`SourceDocument`] into
//! a [`RunResult`] by walking the fixed [`Stage`] sequence. Each stage that
//! talks to the model goes through [`PipelineRunner::run_stage`], which sends a
//! single self-contained prompt with no prior turns.
//!
//! ```text
//! profile → plan → context audit? → structure map → chunk analysis?
//!         → strategy → generate ─┬─ no code ─────────────► failure result
//!                                └─ validate ─┬─ valid ──► explain
//!                                             └─ invalid ─► repair (once) ─► validate
//! ```
//!
//! Nothing here touches the document on disk. The produced [`PendingChange`]
//! is applied separately.

pub mod chunk;
pub mod complexity;
pub mod extract;
pub mod plan;
pub mod prompt;
pub mod stage;
pub mod validate;

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::agent::{CompletionService, GenerationOptions, ServiceError};
use crate::{Instruction, PendingChange, RunResult, SourceDocument, Step};

pub use chunk::{split_into_chunks, Chunk, ChunkSummary};
pub use complexity::{evaluate, evaluate_text, ComplexityLevel, ComplexityProfile};
pub use extract::{extract_code_block, fence_html};
pub use plan::{format_outline, parse_plan};
pub use prompt::truncate_for_prompt;
pub use stage::{Gate, Stage};
pub use validate::{validate_html_structure, ValidationResult};

/// Title of the validation step recorded after a repair attempt
pub const REPAIR_VALIDATION_TITLE: &str = "Validation after repair";

const NO_CODE_MESSAGE: &str = "The model did not return usable HTML code.";
const REPAIR_INVALID_MESSAGE: &str =
    "Automatic repair failed to produce valid HTML. Review the validation step.";
const REPAIR_NO_CODE_MESSAGE: &str = "Automatic repair failed to produce valid HTML.";
const EXPLANATION_FALLBACK: &str = "The model did not return an explanation for the generated code.";
const GENERATION_PLACEHOLDER: &str = "HTML code was delivered as a separate reply in ```html format.";
const NO_RELEVANT_CHUNKS: &str = "The model did not flag specific chunks to change. Use the plan and strategy as the main guide.";
const NO_DOCUMENTED_CHUNKS: &str = "No chunks were considered relevant enough by the model to document.";

/// Errors that abort a run before a [`RunResult`] exists
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Instruction must not be empty")]
    EmptyInstruction,

    #[error("No active document to edit")]
    NoActiveDocument,

    #[error("A run is already in progress for {0}")]
    SessionBusy(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Receives a human-readable label each time a stage starts
pub trait StatusSink: Send + Sync {
    fn on_status(&self, label: &str);
}

impl<F> StatusSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_status(&self, label: &str) {
        self(label)
    }
}

impl StatusSink for mpsc::UnboundedSender<String> {
    fn on_status(&self, label: &str) {
        // Receiver may have gone away; status is advisory.
        let _ = self.send(label.to_string());
    }
}

/// Discards status updates
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStatus;

impl StatusSink for NoStatus {
    fn on_status(&self, _label: &str) {}
}

/// Tunables for a [`PipelineRunner`]
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Delay before each stage that calls the service
    pub pacing: Duration,
    pub snapshot_chars: usize,
    pub repair_code_chars: usize,
    /// Chunk summaries containing any of these are left out of the chunk detail
    pub irrelevant_markers: Vec<String>,
    pub generation: GenerationOptions,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            pacing: Duration::ZERO,
            snapshot_chars: prompt::GENERATION_SNAPSHOT_CHARS,
            repair_code_chars: prompt::REPAIR_CODE_CHARS,
            irrelevant_markers: vec!["not relevant".to_string(), "tidak relevan".to_string()],
            generation: GenerationOptions::default(),
        }
    }
}

/// Lowercase and strip combining marks so "Não" matches "nao"
fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Case- and diacritic-insensitive check for any marker in `text`
pub fn mentions_marker(text: &str, markers: &[String]) -> bool {
    let folded = fold(text);
    markers
        .iter()
        .map(|m| fold(m))
        .any(|m| !m.is_empty() && folded.contains(&m))
}

/// Bullet list of chunk findings, skipping chunks the model called irrelevant
pub fn relevant_chunk_detail(summaries: &[ChunkSummary], markers: &[String]) -> String {
    let details = summaries
        .iter()
        .filter(|s| !mentions_marker(&s.summary, markers))
        .map(|s| format!("• Lines {}-{}:\n{}", s.start_line, s.end_line, s.summary))
        .collect::<Vec<_>>()
        .join("\n\n");

    if details.is_empty() {
        NO_RELEVANT_CHUNKS.to_string()
    } else {
        details
    }
}

/// Drives one instruction through every stage against a completion service.
pub struct PipelineRunner<'a> {
    service: &'a dyn CompletionService,
    settings: PipelineSettings,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(service: &'a dyn CompletionService, settings: PipelineSettings) -> Self {
        Self { service, settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Validate raw inputs, then [`run`](Self::run).
    ///
    /// Input errors are reported before any step is recorded or any request
    /// is sent.
    pub async fn run_request(
        &self,
        instruction: &str,
        document: Option<&SourceDocument>,
        status: &dyn StatusSink,
    ) -> Result<RunResult, PipelineError> {
        let instruction = Instruction::new(instruction)?;
        let document = document.ok_or(PipelineError::NoActiveDocument)?;
        self.run(&instruction, document, status).await
    }

    /// Run the full stage sequence.
    ///
    /// A service error aborts the run and is returned unchanged. Missing or
    /// invalid code is not an error: the result carries an empty change and
    /// explains what happened.
    pub async fn run(
        &self,
        instruction: &Instruction,
        document: &SourceDocument,
        status: &dyn StatusSink,
    ) -> Result<RunResult, PipelineError> {
        let started = Instant::now();
        let mut steps = Vec::new();

        // Profile
        status.on_status(Stage::Profile.status_label());
        let profile = evaluate(instruction, document);
        info!(
            document = %document.name,
            level = %profile.level,
            score = profile.score,
            "Pipeline run started"
        );
        steps.push(Step::new(Stage::Profile.title(), profile.describe(document)));

        // Plan
        let plan_prompt = prompt::plan_prompt(instruction, document, &profile);
        let plan_response = self.run_stage(Stage::Plan, &plan_prompt, status).await?;
        let plan_items = parse_plan(&plan_response);
        let plan_outline = format_outline(&plan_items);
        if plan_items.is_empty() {
            warn!("Plan response contained no numbered items");
        }
        steps.push(Step::new(
            Stage::Plan.title(),
            prompt::format_plan_step(&plan_prompt, &plan_response, &plan_outline),
        ));

        // Context audit
        let context_summary = match Stage::ContextAudit.gate(&profile) {
            Gate::Run => {
                let audit_prompt = prompt::context_audit_prompt(instruction, document, &plan_outline);
                let response = self
                    .run_stage(Stage::ContextAudit, &audit_prompt, status)
                    .await?;
                steps.push(Step::new(
                    Stage::ContextAudit.title(),
                    prompt::format_exchange(&audit_prompt, &response),
                ));
                response
            }
            Gate::Skip(reason) => {
                debug!(%reason, "Context audit skipped");
                let placeholder =
                    prompt::skipped_audit_summary(plan_items.first().map(String::as_str));
                steps.push(Step::new(Stage::ContextAudit.title(), placeholder.clone()));
                placeholder
            }
        };

        // Structure map
        status.on_status(Stage::StructureMap.status_label());
        let chunks = split_into_chunks(&document.content, profile.chunk_size);
        steps.push(Step::new(
            Stage::StructureMap.title(),
            prompt::structure_summary(document, profile.chunk_size, chunks.len(), &profile),
        ));

        // Chunk analysis
        let chunk_detail = match Stage::ChunkAnalysis.gate(&profile) {
            Gate::Run => {
                let (detail, body) = self
                    .analyze_chunks(instruction, &chunks, &plan_outline, &context_summary, &profile, status)
                    .await?;
                steps.push(Step::new(Stage::ChunkAnalysis.title(), body));
                detail
            }
            Gate::Skip(reason) => {
                let body = format!("Chunk analysis skipped because {}.", reason);
                steps.push(Step::new(Stage::ChunkAnalysis.title(), body.clone()));
                body
            }
        };

        // Strategy
        let strategy_prompt = prompt::strategy_prompt(
            instruction,
            &plan_outline,
            &context_summary,
            &chunk_detail,
            &profile,
        );
        let strategy = self
            .run_stage(Stage::Strategy, &strategy_prompt, status)
            .await?;
        steps.push(Step::new(
            Stage::Strategy.title(),
            prompt::format_exchange(&strategy_prompt, &strategy),
        ));

        // Generate
        let snapshot = prompt::context_snapshot(&document.content, self.settings.snapshot_chars);
        let outline_for_code = if plan_outline.is_empty() {
            plan_response.as_str()
        } else {
            plan_outline.as_str()
        };
        let generation_prompt = prompt::generation_prompt(&prompt::GenerationContext {
            instruction,
            plan_outline: outline_for_code,
            strategy: &strategy,
            context_summary: &context_summary,
            chunk_detail: &chunk_detail,
            snapshot: &snapshot,
            profile: &profile,
        });
        let generation_response = self
            .run_stage(Stage::Generate, &generation_prompt, status)
            .await?;

        let Some(mut code) = extract_code_block(&generation_response) else {
            warn!("Generation response contained no code block");
            steps.push(Step::new(
                Stage::Generate.title(),
                prompt::format_exchange(&generation_prompt, &generation_response),
            ));
            return Ok(RunResult {
                steps,
                summary: NO_CODE_MESSAGE.to_string(),
                notes: vec![complexity_note(&profile)],
                change: PendingChange::default(),
                explanation: NO_CODE_MESSAGE.to_string(),
                code_block: None,
            });
        };
        steps.push(Step::new(
            Stage::Generate.title(),
            prompt::format_exchange(&generation_prompt, GENERATION_PLACEHOLDER),
        ));

        // Validate
        status.on_status(Stage::Validate.status_label());
        let validation = validate_html_structure(&code);
        steps.push(Step::new(
            Stage::Validate.title(),
            prompt::describe_validation(&validation),
        ));

        let mut notes = vec![
            complexity_note(&profile),
            format!(
                "Context audit: {}.",
                if profile.requires_context_audit { "ran" } else { "skipped" }
            ),
            format!(
                "Chunk analysis: {}.",
                if profile.requires_chunk_analysis { "ran" } else { "skipped" }
            ),
            format!("Analysis chunk size: {} lines.", profile.chunk_size),
        ];

        // Repair, at most once
        if !validation.is_valid {
            warn!(issues = validation.issues.len(), "Generated document failed validation");
            let repair_prompt = prompt::repair_prompt(
                instruction,
                &code,
                &validation.issues,
                self.settings.repair_code_chars,
            );
            let repair_response = self.run_stage(Stage::Repair, &repair_prompt, status).await?;
            steps.push(Step::new(
                Stage::Repair.title(),
                prompt::format_exchange(&repair_prompt, &repair_response),
            ));

            let Some(repaired) = extract_code_block(&repair_response) else {
                warn!("Repair response contained no code block");
                steps.push(Step::new(
                    REPAIR_VALIDATION_TITLE,
                    "The model did not return an HTML code block during the repair attempt.",
                ));
                notes.push("The model returned no HTML code during repair.".to_string());
                return Ok(RunResult {
                    steps,
                    summary: REPAIR_NO_CODE_MESSAGE.to_string(),
                    notes,
                    change: PendingChange::default(),
                    explanation: REPAIR_NO_CODE_MESSAGE.to_string(),
                    code_block: None,
                });
            };

            let revalidation = validate_html_structure(&repaired);
            steps.push(Step::new(
                REPAIR_VALIDATION_TITLE,
                prompt::describe_validation(&revalidation),
            ));
            if !revalidation.is_valid {
                warn!("Repaired document is still invalid");
                notes.push(REPAIR_NO_CODE_MESSAGE.to_string());
                return Ok(RunResult {
                    steps,
                    summary: REPAIR_INVALID_MESSAGE.to_string(),
                    notes,
                    change: PendingChange::default(),
                    explanation: REPAIR_INVALID_MESSAGE.to_string(),
                    code_block: Some(fence_html(&repaired)),
                });
            }
            notes.push("Automatic structure repair succeeded.".to_string());
            code = repaired;
        }

        // Explain
        let explanation_prompt =
            prompt::explanation_prompt(&code, instruction, &plan_outline, &profile);
        let raw = self
            .run_stage(Stage::Explain, &explanation_prompt, status)
            .await?;
        let explanation = match raw.trim() {
            "" => EXPLANATION_FALLBACK.to_string(),
            text => text.to_string(),
        };
        steps.push(Step::new(
            Stage::Explain.title(),
            prompt::format_exchange(&explanation_prompt, &explanation),
        ));

        info!(
            steps = steps.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pipeline run finished"
        );

        Ok(RunResult {
            steps,
            summary: explanation.replace('\n', " ").trim().to_string(),
            notes,
            code_block: Some(fence_html(&code)),
            change: PendingChange::full(code),
            explanation,
        })
    }

    /// Announce `stage`, wait out the pacing delay, then send one stateless
    /// request.
    pub async fn run_stage(
        &self,
        stage: Stage,
        prompt: &str,
        status: &dyn StatusSink,
    ) -> Result<String, PipelineError> {
        status.on_status(stage.status_label());
        self.pace().await;
        info!(stage = %stage, "Running stage");
        self.request(stage, prompt).await
    }

    async fn pace(&self) {
        if !self.settings.pacing.is_zero() {
            tokio::time::sleep(self.settings.pacing).await;
        }
    }

    async fn request(&self, stage: Stage, prompt: &str) -> Result<String, PipelineError> {
        debug!(
            stage = %stage,
            service = self.service.id(),
            prompt_chars = prompt.chars().count(),
            "Sending prompt"
        );
        let response = self
            .service
            .generate(prompt, &[], &self.settings.generation)
            .await
            .inspect_err(|e| warn!(stage = %stage, error = %e, "Completion request failed"))?;
        debug!(stage = %stage, response_chars = response.chars().count(), "Received response");
        Ok(response)
    }

    /// One request per chunk, strictly in order. Returns the chunk detail
    /// used by later prompts and the step body.
    async fn analyze_chunks(
        &self,
        instruction: &Instruction,
        chunks: &[Chunk],
        plan_outline: &str,
        context_summary: &str,
        profile: &ComplexityProfile,
        status: &dyn StatusSink,
    ) -> Result<(String, String), PipelineError> {
        status.on_status(Stage::ChunkAnalysis.status_label());
        self.pace().await;
        info!(chunks = chunks.len(), "Analyzing chunks");

        let limit = profile.documented_chunk_limit;
        let mut summaries = Vec::with_capacity(chunks.len());
        let mut documented = Vec::new();

        for chunk in chunks {
            let chunk_prompt = prompt::chunk_prompt(instruction, chunk, plan_outline, context_summary);
            let response = self.request(Stage::ChunkAnalysis, &chunk_prompt).await?;
            if documented.len() < limit {
                documented.push(prompt::format_chunk_exchange(chunk, &chunk_prompt, &response));
            }
            summaries.push(ChunkSummary::new(chunk, response));
        }

        let detail = relevant_chunk_detail(&summaries, &self.settings.irrelevant_markers);

        let mut body = documented.join("\n\n");
        if body.is_empty() {
            body = NO_DOCUMENTED_CHUNKS.to_string();
        }
        if summaries.len() > limit {
            body.push_str(&format!(
                "\n\nNote: {} additional chunks were analyzed but not shown.",
                summaries.len() - limit
            ));
        }
        Ok((detail, body))
    }
}

fn complexity_note(profile: &ComplexityProfile) -> String {
    format!(
        "Task complexity: {} (score {}).",
        profile.level.label(),
        profile.score
    )
}

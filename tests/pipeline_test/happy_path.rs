//! Simple instructions on small documents

use std::sync::Mutex;

use seditor::pipeline::{NoStatus, PipelineRunner, PipelineSettings, Stage};
use seditor::{Instruction, PendingChange};

use crate::common::*;

fn happy_service() -> ScriptedService {
    ScriptedService::replies(&[PLAN_REPLY, STRATEGY_REPLY, fenced(VALID_HTML).as_str(), EXPLANATION_REPLY])
}

#[tokio::test]
async fn test_low_complexity_run_produces_full_content() {
    let service = happy_service();
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let document = html_document(12);
    let instruction = Instruction::new("Add a footer").unwrap();

    let result = runner.run(&instruction, &document, &NoStatus).await.unwrap();

    assert_eq!(result.change, PendingChange::full(VALID_HTML));
    assert_eq!(
        result.code_block.as_deref(),
        Some(format!("```html\n{}\n```", VALID_HTML).as_str())
    );
    assert_eq!(result.explanation, EXPLANATION_REPLY);
    assert_eq!(
        result.summary,
        "The page now ends with a footer. It keeps the old layout."
    );
    assert_eq!(service.call_count(), 4);
}

#[tokio::test]
async fn test_step_order_for_simple_task() {
    let service = happy_service();
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let instruction = Instruction::new("Add a footer").unwrap();

    let result = runner
        .run(&instruction, &html_document(12), &NoStatus)
        .await
        .unwrap();

    let titles: Vec<&str> = result.steps.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            Stage::Profile.title(),
            Stage::Plan.title(),
            Stage::ContextAudit.title(),
            Stage::StructureMap.title(),
            Stage::ChunkAnalysis.title(),
            Stage::Strategy.title(),
            Stage::Generate.title(),
            Stage::Validate.title(),
            Stage::Explain.title(),
        ]
    );

    // Skipped stages still leave a record
    assert!(result.steps[2].body.contains("context audit was skipped"));
    assert!(result.steps[2].body.contains("Focus on Read the body."));
    assert!(result.steps[4].body.starts_with("Chunk analysis skipped because"));
    assert!(
        result.steps[1]
            .body
            .ends_with("Structured steps:\n1. Read the body\n2. Add the footer\nkeep it short")
    );
    assert!(result.steps[7].body.contains("all required elements"));
}

#[tokio::test]
async fn test_calls_are_stateless_and_ordered() {
    let service = happy_service();
    let mut settings = PipelineSettings::default();
    settings.generation.temperature = 0.1;
    let runner = PipelineRunner::new(&service, settings);
    let instruction = Instruction::new("Add a footer").unwrap();

    runner
        .run(&instruction, &html_document(12), &NoStatus)
        .await
        .unwrap();

    let calls = service.calls();
    assert!(calls.iter().all(|c| c.prior_turns == 0));
    assert!(calls.iter().all(|c| c.options.temperature == 0.1));

    let kinds: Vec<PromptKind> = calls.iter().map(|c| classify(&c.prompt)).collect();
    assert_eq!(
        kinds,
        vec![
            PromptKind::Plan,
            PromptKind::Strategy,
            PromptKind::Generate,
            PromptKind::Explain
        ]
    );
}

#[tokio::test]
async fn test_later_prompts_carry_earlier_results() {
    let service = happy_service();
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let instruction = Instruction::new("Add a footer").unwrap();

    runner
        .run(&instruction, &html_document(12), &NoStatus)
        .await
        .unwrap();

    let prompts = service.prompts();
    let outline = "1. Read the body\n2. Add the footer\nkeep it short";
    assert!(prompts[1].contains(outline));
    assert!(prompts[2].contains(STRATEGY_REPLY));
    assert!(prompts[2].contains("<p>line 0</p>"));
    assert!(prompts[3].contains(VALID_HTML));
    assert!(prompts.iter().all(|p| p.contains("\"Add a footer\"")));
}

#[tokio::test]
async fn test_status_labels_follow_executed_stages() {
    let service = happy_service();
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let labels = Mutex::new(Vec::new());
    let sink = |label: &str| labels.lock().unwrap().push(label.to_string());

    runner
        .run_request("Add a footer", Some(&html_document(12)), &sink)
        .await
        .unwrap();

    let expected: Vec<String> = [
        Stage::Profile,
        Stage::Plan,
        Stage::StructureMap,
        Stage::Strategy,
        Stage::Generate,
        Stage::Validate,
        Stage::Explain,
    ]
    .iter()
    .map(|s| s.status_label().to_string())
    .collect();
    assert_eq!(*labels.lock().unwrap(), expected);
}

#[tokio::test]
async fn test_empty_explanation_uses_fallback() {
    let service = ScriptedService::replies(&[PLAN_REPLY, STRATEGY_REPLY, fenced(VALID_HTML).as_str(), "  \n "]);
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let instruction = Instruction::new("Add a footer").unwrap();

    let result = runner
        .run(&instruction, &html_document(12), &NoStatus)
        .await
        .unwrap();

    assert!(result.has_change());
    assert_eq!(
        result.explanation,
        "The model did not return an explanation for the generated code."
    );
    assert_eq!(result.summary, result.explanation);
}

#[tokio::test]
async fn test_success_notes() {
    let service = happy_service();
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let instruction = Instruction::new("Add a footer").unwrap();

    let result = runner
        .run(&instruction, &html_document(12), &NoStatus)
        .await
        .unwrap();

    assert_eq!(
        result.notes,
        vec![
            "Task complexity: Low (score 0).".to_string(),
            "Context audit: skipped.".to_string(),
            "Chunk analysis: skipped.".to_string(),
            "Analysis chunk size: 200 lines.".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_unnumbered_plan_still_reaches_generation() {
    let service = ScriptedService::replies(&[
        "Just add it at the bottom.",
        STRATEGY_REPLY,
        fenced(VALID_HTML).as_str(),
        EXPLANATION_REPLY,
    ]);
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let instruction = Instruction::new("Add a footer").unwrap();

    let result = runner
        .run(&instruction, &html_document(12), &NoStatus)
        .await
        .unwrap();

    assert!(result.has_change());
    assert!(service.prompts()[2].contains("Just add it at the bottom."));
}

//! Validation failures and the single repair attempt

use seditor::pipeline::{NoStatus, PipelineRunner, PipelineSettings, Stage, REPAIR_VALIDATION_TITLE};
use seditor::{Instruction, PendingChange};

use crate::common::*;

fn instruction() -> Instruction {
    Instruction::new("Add a footer").unwrap()
}

#[tokio::test]
async fn test_repair_success_uses_repaired_document() {
    let service = ScriptedService::replies(&[
        PLAN_REPLY,
        STRATEGY_REPLY,
        fenced(INVALID_HTML).as_str(),
        fenced(VALID_HTML).as_str(),
        EXPLANATION_REPLY,
    ]);
    let runner = PipelineRunner::new(&service, PipelineSettings::default());

    let result = runner
        .run(&instruction(), &html_document(12), &NoStatus)
        .await
        .unwrap();

    assert_eq!(result.change, PendingChange::full(VALID_HTML));
    assert_eq!(result.steps_titled(Stage::Repair.title()).count(), 1);

    let revalidation: Vec<_> = result.steps_titled(REPAIR_VALIDATION_TITLE).collect();
    assert_eq!(revalidation.len(), 1);
    assert!(revalidation[0].body.contains("all required elements"));
    assert!(
        result
            .notes
            .contains(&"Automatic structure repair succeeded.".to_string())
    );

    let kinds: Vec<_> = service.prompts().iter().map(|p| classify(p)).collect();
    assert_eq!(kinds[3], PromptKind::Repair);
    assert_eq!(kinds[4], PromptKind::Explain);
    // Explanation describes the repaired document
    assert!(service.prompts()[4].contains(VALID_HTML));
}

#[tokio::test]
async fn test_repair_prompt_lists_validation_issues() {
    let service = ScriptedService::replies(&[
        PLAN_REPLY,
        STRATEGY_REPLY,
        fenced(INVALID_HTML).as_str(),
        fenced(VALID_HTML).as_str(),
        EXPLANATION_REPLY,
    ]);
    let runner = PipelineRunner::new(&service, PipelineSettings::default());

    runner
        .run(&instruction(), &html_document(12), &NoStatus)
        .await
        .unwrap();

    let repair_prompt = &service.prompts()[3];
    assert!(repair_prompt.contains("1. Missing <!DOCTYPE html> declaration."));
    assert!(repair_prompt.contains("The <body> section is incomplete."));
    assert!(repair_prompt.contains(INVALID_HTML));
}

#[tokio::test]
async fn test_repair_still_invalid_yields_no_change() {
    let still_broken = "<html>\n<body>oops</body>\n</html>";
    let service = ScriptedService::replies(&[
        PLAN_REPLY,
        STRATEGY_REPLY,
        fenced(INVALID_HTML).as_str(),
        fenced(still_broken).as_str(),
    ]);
    let runner = PipelineRunner::new(&service, PipelineSettings::default());

    let result = runner
        .run(&instruction(), &html_document(12), &NoStatus)
        .await
        .unwrap();

    assert!(!result.has_change());
    assert!(result.change.is_empty());
    assert_eq!(result.steps_titled(Stage::Repair.title()).count(), 1);
    assert_eq!(result.steps_titled(Stage::Explain.title()).count(), 0);
    assert_eq!(
        result.code_block.as_deref(),
        Some(format!("```html\n{}\n```", still_broken).as_str())
    );
    assert!(result.summary.contains("Automatic repair failed"));
    // No second repair and no explanation
    assert_eq!(service.call_count(), 4);
}

#[tokio::test]
async fn test_repair_without_code_yields_no_change() {
    let service = ScriptedService::replies(&[
        PLAN_REPLY,
        STRATEGY_REPLY,
        fenced(INVALID_HTML).as_str(),
        "I cannot fix this.",
    ]);
    let runner = PipelineRunner::new(&service, PipelineSettings::default());

    let result = runner
        .run(&instruction(), &html_document(12), &NoStatus)
        .await
        .unwrap();

    assert!(!result.has_change());
    assert!(result.code_block.is_none());
    assert_eq!(result.steps_titled(Stage::Repair.title()).count(), 1);
    let last = result.steps.last().unwrap();
    assert_eq!(last.title, REPAIR_VALIDATION_TITLE);
    assert!(
        result
            .notes
            .contains(&"The model returned no HTML code during repair.".to_string())
    );
    assert_eq!(service.call_count(), 4);
}

#[tokio::test]
async fn test_repair_code_is_truncated_to_setting() {
    let long_invalid = format!("<div>\n{}\n</div>", "<p>filler</p>\n".repeat(100));
    let service = ScriptedService::replies(&[
        PLAN_REPLY,
        STRATEGY_REPLY,
        fenced(&long_invalid).as_str(),
        fenced(VALID_HTML).as_str(),
        EXPLANATION_REPLY,
    ]);
    let settings = PipelineSettings {
        repair_code_chars: 300,
        ..PipelineSettings::default()
    };
    let runner = PipelineRunner::new(&service, settings);

    let result = runner
        .run(&instruction(), &html_document(12), &NoStatus)
        .await
        .unwrap();

    assert!(result.has_change());
    let repair_prompt = &service.prompts()[3];
    assert!(repair_prompt.contains("\n...\n"));
    assert!(!repair_prompt.contains(long_invalid.trim()));
}

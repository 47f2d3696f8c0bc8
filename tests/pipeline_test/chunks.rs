//! Context audit and chunk analysis on larger documents

use seditor::pipeline::{NoStatus, PipelineRunner, PipelineSettings, Stage};
use seditor::Instruction;

use crate::common::*;

/// Answers by stage; only the first chunk is reported as relevant
fn chunk_service(irrelevant_reply: &'static str) -> ScriptedService {
    ScriptedService::responder(move |prompt| {
        let reply = match classify(prompt) {
            PromptKind::Plan => PLAN_REPLY.to_string(),
            PromptKind::ContextAudit => "A static page with a long body.".to_string(),
            PromptKind::Chunk if prompt.contains("lines 1-150:") => {
                "Relevant: the body starts here.".to_string()
            }
            PromptKind::Chunk => irrelevant_reply.to_string(),
            PromptKind::Strategy => STRATEGY_REPLY.to_string(),
            PromptKind::Generate => fenced(VALID_HTML),
            PromptKind::Repair => fenced(VALID_HTML),
            PromptKind::Explain => EXPLANATION_REPLY.to_string(),
        };
        Ok(reply)
    })
}

#[tokio::test]
async fn test_medium_task_runs_audit_and_chunks_in_order() {
    let service = chunk_service("Not relevant because it is only paragraphs.");
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let instruction = Instruction::new("Add a footer").unwrap();

    let result = runner
        .run(&instruction, &html_document(700), &NoStatus)
        .await
        .unwrap();
    assert!(result.has_change());

    let calls = service.calls();
    let kinds: Vec<_> = calls.iter().map(|c| classify(&c.prompt)).collect();
    assert_eq!(
        kinds,
        vec![
            PromptKind::Plan,
            PromptKind::ContextAudit,
            PromptKind::Chunk,
            PromptKind::Chunk,
            PromptKind::Chunk,
            PromptKind::Chunk,
            PromptKind::Chunk,
            PromptKind::Strategy,
            PromptKind::Generate,
            PromptKind::Explain,
        ]
    );
    assert!(calls.iter().all(|c| c.prior_turns == 0));

    let ranges = ["1-150", "151-300", "301-450", "451-600", "601-700"];
    for (call, range) in calls[2..7].iter().zip(ranges) {
        assert!(
            call.prompt.contains(&format!("lines {}:", range)),
            "chunk prompt out of order, expected {}",
            range
        );
    }

    // Chunk prompts see the audit result
    assert!(calls[2].prompt.contains("A static page with a long body."));
}

#[tokio::test]
async fn test_chunk_detail_excludes_irrelevant_chunks() {
    let service = chunk_service("Tidak relevan karena hanya paragraf.");
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let instruction = Instruction::new("Add a footer").unwrap();

    runner
        .run(&instruction, &html_document(700), &NoStatus)
        .await
        .unwrap();

    let strategy_prompt = service
        .prompts()
        .into_iter()
        .find(|p| classify(p) == PromptKind::Strategy)
        .unwrap();
    assert!(strategy_prompt.contains("• Lines 1-150:\nRelevant: the body starts here."));
    assert!(!strategy_prompt.contains("Lines 151-300"));
    assert!(!strategy_prompt.contains("Tidak relevan"));
}

#[tokio::test]
async fn test_custom_marker_is_honored() {
    let service = chunk_service("Nothing to see in this part.");
    let settings = PipelineSettings {
        irrelevant_markers: vec!["nothing to see".to_string()],
        ..PipelineSettings::default()
    };
    let runner = PipelineRunner::new(&service, settings);
    let instruction = Instruction::new("Add a footer").unwrap();

    runner
        .run(&instruction, &html_document(700), &NoStatus)
        .await
        .unwrap();

    let strategy_prompt = service
        .prompts()
        .into_iter()
        .find(|p| classify(p) == PromptKind::Strategy)
        .unwrap();
    assert!(!strategy_prompt.contains("Nothing to see"));
}

#[tokio::test]
async fn test_chunk_step_documents_only_the_limit() {
    let service = chunk_service("Not relevant because it is only paragraphs.");
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let instruction = Instruction::new("Add a footer").unwrap();

    let result = runner
        .run(&instruction, &html_document(700), &NoStatus)
        .await
        .unwrap();

    let chunk_step = result
        .steps_titled(Stage::ChunkAnalysis.title())
        .next()
        .unwrap();
    // Medium complexity documents four chunk exchanges
    assert_eq!(chunk_step.body.matches("[Chunk ").count(), 4);
    assert!(chunk_step.body.contains("[Chunk 1 • Lines 1-150]"));
    assert!(!chunk_step.body.contains("[Chunk 5"));
    assert!(
        chunk_step
            .body
            .ends_with("Note: 1 additional chunks were analyzed but not shown.")
    );
}

#[tokio::test]
async fn test_high_complexity_documents_six_chunks() {
    // refactor (+2), responsive (+1), 800 lines (+3): high, chunks of 110
    let service = chunk_service("Not relevant because it is only paragraphs.");
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let instruction = Instruction::new("Refactor the layout and make it responsive").unwrap();

    let result = runner
        .run(&instruction, &html_document(800), &NoStatus)
        .await
        .unwrap();
    assert!(result.notes.iter().any(|n| n.starts_with("Task complexity: High")));

    let chunk_calls = service
        .prompts()
        .iter()
        .filter(|p| classify(p) == PromptKind::Chunk)
        .count();
    assert_eq!(chunk_calls, 8);

    let chunk_step = result
        .steps_titled(Stage::ChunkAnalysis.title())
        .next()
        .unwrap();
    assert_eq!(chunk_step.body.matches("[Chunk ").count(), 6);
    assert!(chunk_step.body.contains("[Chunk 6 • Lines 551-660]"));
    assert!(!chunk_step.body.contains("[Chunk 7"));
    assert!(
        chunk_step
            .body
            .ends_with("Note: 2 additional chunks were analyzed but not shown.")
    );
}

#[tokio::test]
async fn test_large_low_complexity_document_is_audited_only() {
    // 180 lines: low complexity, but long enough for an audit
    let service = chunk_service("unused");
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let instruction = Instruction::new("Fix typo").unwrap();

    let result = runner
        .run(&instruction, &html_document(180), &NoStatus)
        .await
        .unwrap();

    let kinds: Vec<_> = service.prompts().iter().map(|p| classify(p)).collect();
    assert!(kinds.contains(&PromptKind::ContextAudit));
    assert!(!kinds.contains(&PromptKind::Chunk));
    let chunk_step = result
        .steps_titled(Stage::ChunkAnalysis.title())
        .next()
        .unwrap();
    assert!(chunk_step.body.starts_with("Chunk analysis skipped because"));
}

#[tokio::test]
async fn test_long_document_alone_triggers_chunking() {
    // 260 lines scores +3 on length alone: medium, chunks of 150
    let service = chunk_service("Not relevant.");
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let instruction = Instruction::new("Fix typo").unwrap();

    runner
        .run(&instruction, &html_document(260), &NoStatus)
        .await
        .unwrap();

    let chunk_calls = service
        .prompts()
        .iter()
        .filter(|p| classify(p) == PromptKind::Chunk)
        .count();
    assert_eq!(chunk_calls, 2);
}

//! Recording runs in a persisted conversation and applying the result

use std::time::Duration;

use seditor::conversation::{storage_key, ConversationStore, MessageContent};
use seditor::pipeline::{NoStatus, PipelineRunner, PipelineSettings};
use seditor::{Instruction, PipelineError};

use crate::common::*;

#[tokio::test]
async fn test_run_is_recorded_and_applied() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = dir.path().join("index.html");
    let document = html_document(12);
    std::fs::write(&doc_path, &document.content).unwrap();

    let store = ConversationStore::new(dir.path().join("conversations"));
    let key = storage_key(Some(&doc_path));
    let mut conversation = store.load_or_default(&key);

    let service = ScriptedService::replies(&[PLAN_REPLY, STRATEGY_REPLY, fenced(VALID_HTML).as_str(), EXPLANATION_REPLY]);
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let instruction = Instruction::new("Add a footer").unwrap();

    let placeholder = conversation.begin_run(&instruction);
    let result = runner.run(&instruction, &document, &NoStatus).await.unwrap();
    assert!(conversation.complete_run(placeholder, &result, Duration::from_millis(40)));
    store.save(&key, &conversation).unwrap();

    // A later session finds the pending change
    let mut restored = store.load(&key).unwrap().unwrap();
    let change = restored.current_change().cloned().unwrap();
    let updated = change.apply_to(&std::fs::read_to_string(&doc_path).unwrap());
    std::fs::write(&doc_path, &updated).unwrap();
    assert!(restored.mark_applied());
    store.save(&key, &restored).unwrap();

    assert_eq!(std::fs::read_to_string(&doc_path).unwrap(), VALID_HTML);
    let reloaded = store.load(&key).unwrap().unwrap();
    assert!(reloaded.current_change().is_none());
    assert!(reloaded.messages.iter().any(|m| matches!(
        &m.content,
        MessageContent::Code { code } if code.applied
    )));
}

#[tokio::test]
async fn test_failed_run_is_recorded_as_text() {
    let service = ScriptedService::new(vec![Err(seditor::agent::ServiceError::MissingApiKey)]);
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let instruction = Instruction::new("Add a footer").unwrap();

    let mut conversation = seditor::conversation::Conversation::new();
    let placeholder = conversation.begin_run(&instruction);
    let err = runner
        .run(&instruction, &html_document(12), &NoStatus)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Service(_)));

    conversation.fail_run(placeholder, &err.to_string());
    assert_eq!(conversation.messages.len(), 2);
    match &conversation.messages[1].content {
        MessageContent::Text { text } => assert!(text.contains(&err.to_string())),
        other => panic!("unexpected content: {:?}", other),
    }
    assert!(conversation.current_change().is_none());
}

#[tokio::test]
async fn test_no_change_run_leaves_nothing_pending() {
    let service = ScriptedService::replies(&[PLAN_REPLY, STRATEGY_REPLY, "no code here"]);
    let runner = PipelineRunner::new(&service, PipelineSettings::default());
    let instruction = Instruction::new("Add a footer").unwrap();

    let mut conversation = seditor::conversation::Conversation::new();
    let placeholder = conversation.begin_run(&instruction);
    let result = runner
        .run(&instruction, &html_document(12), &NoStatus)
        .await
        .unwrap();
    conversation.complete_run(placeholder, &result, Duration::ZERO);

    // User message plus the step summary, no code message
    assert_eq!(conversation.messages.len(), 2);
    assert!(conversation.current_change().is_none());
}

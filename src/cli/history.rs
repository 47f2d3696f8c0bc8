//! History command implementation

use anyhow::Result;
use std::path::Path;

use seditor::config::Config;
use seditor::conversation::{storage_key, MessageContent, MessageRole};

/// Print the stored conversation for a document
pub fn history_command(work_dir: &Path, config: &Config, file: &Path, full: bool) -> Result<()> {
    let path = super::resolve(work_dir, file);
    let store = super::conversation_store(config);
    let Some(conversation) = store.load(&storage_key(Some(&path)))? else {
        println!("No conversation stored for {}", path.display());
        return Ok(());
    };

    for message in &conversation.messages {
        let who = match message.role {
            MessageRole::User => "you",
            MessageRole::Assistant => "ai",
        };
        match &message.content {
            MessageContent::Text { text } => println!("[{}] {}", who, text),
            MessageContent::AnalysisStatus { status } => println!(
                "[{}] (interrupted at \"{}\", started {})",
                who,
                status.current_step,
                status.started_at.format("%Y-%m-%d %H:%M:%S")
            ),
            MessageContent::Steps { summary } => {
                println!(
                    "[{}] {} steps in {:.1}s{}",
                    who,
                    summary.steps.len(),
                    summary.duration,
                    if summary.code_applied { ", applied" } else { "" }
                );
                for step in &summary.steps {
                    if full {
                        println!("    {}\n", step.to_string().replace('\n', "\n    "));
                    } else {
                        println!("    - {}", step.title);
                    }
                }
                println!("    {}", summary.summary_text);
            }
            MessageContent::Code { code } => {
                let state = if code.applied { "applied" } else { "pending" };
                println!("[{}] code change ({})", who, state);
                if let Some(explanation) = &code.explanation {
                    println!("    {}", explanation);
                }
            }
            MessageContent::Unknown => {}
        }
    }

    if conversation.current_change().is_some() {
        println!("\nA change is pending. Apply it with: seditor apply {}", path.display());
    }
    Ok(())
}

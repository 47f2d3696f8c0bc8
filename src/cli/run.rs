//! Run command implementation

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::info;

use seditor::agent::GeminiClient;
use seditor::config::Config;
use seditor::conversation::storage_key;
use seditor::pipeline::PipelineRunner;
use seditor::{Instruction, RunResult, SourceDocument};

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub json: bool,
    pub apply: bool,
}

/// Run the pipeline for one document and record it in the conversation
pub async fn run_command(
    work_dir: &Path,
    config: &Config,
    file: &Path,
    instruction: &str,
    options: RunOptions,
) -> Result<()> {
    let path = super::resolve(work_dir, file);
    let instruction = Instruction::new(instruction)?;
    let document = SourceDocument::from_file(&path)?;

    // Held from load to save
    let store = super::conversation_store(config);
    let key = storage_key(Some(&path));
    let _lock = store.lock(&key)?;

    let api_key = config.ai.api_key();
    let client = match &config.ai.base_url {
        Some(url) => GeminiClient::with_url(url, api_key),
        None => GeminiClient::new(api_key),
    };

    let mut conversation = store.load_or_default(&key);
    let placeholder = conversation.begin_run(&instruction);

    let (status_tx, mut status_rx) = mpsc::unbounded_channel::<String>();
    let printer = tokio::spawn(async move {
        while let Some(label) = status_rx.recv().await {
            eprintln!("» {}", label);
        }
    });

    let runner = PipelineRunner::new(&client, config.pipeline_settings());
    let started = Instant::now();
    let outcome = runner.run(&instruction, &document, &status_tx).await;
    drop(status_tx);
    let _ = printer.await;

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            conversation.fail_run(placeholder, &e.to_string());
            store.save(&key, &conversation)?;
            return Err(e.into());
        }
    };

    conversation.complete_run(placeholder, &result, started.elapsed());

    if options.apply && result.has_change() {
        let updated = result.change.apply_to(&document.content);
        std::fs::write(&path, updated)
            .with_context(|| format!("Failed to write document: {}", path.display()))?;
        conversation.mark_applied();
        info!("Applied change to {}", path.display());
    }
    store.save(&key, &conversation)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result, &path, options.apply);
    }

    Ok(())
}

fn print_result(result: &RunResult, path: &Path, applied: bool) {
    for step in &result.steps {
        println!("== {} ==", step.title);
        println!("{}\n", step.body);
    }

    if !result.notes.is_empty() {
        println!("Notes:");
        for note in &result.notes {
            println!("  - {}", note);
        }
        println!();
    }

    println!("{}", result.summary);

    if !result.has_change() {
        println!("\nNo change was produced. Review the steps above for manual edits.");
    } else if applied {
        println!("\nChange applied to {}", path.display());
    } else {
        println!(
            "\nChange stored. Apply it with: seditor apply {}",
            path.display()
        );
    }
}

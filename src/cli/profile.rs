//! Profile command implementation

use anyhow::Result;
use std::path::Path;

use seditor::pipeline::{evaluate, split_into_chunks, Gate, Stage};
use seditor::{Instruction, SourceDocument};

/// Print the complexity profile and stage plan for an instruction
pub fn profile_command(work_dir: &Path, file: &Path, instruction: &str) -> Result<()> {
    let path = super::resolve(work_dir, file);
    let instruction = Instruction::new(instruction)?;
    let document = SourceDocument::from_file(&path)?;

    let profile = evaluate(&instruction, &document);
    let chunks = split_into_chunks(&document.content, profile.chunk_size);

    println!("{}\n", profile.describe(&document));
    println!("Chunks: {} of up to {} lines", chunks.len(), profile.chunk_size);
    println!("Stages:");
    for stage in Stage::ALL {
        match stage.gate(&profile) {
            Gate::Run if stage == Stage::Repair => {
                println!("  {:<22} only if validation fails", stage.title())
            }
            Gate::Run => println!("  {:<22} run", stage.title()),
            Gate::Skip(reason) => println!("  {:<22} skip ({})", stage.title(), reason),
        }
    }

    Ok(())
}

//! Apply command implementation

use anyhow::{Context, Result};
use std::path::Path;

use seditor::config::Config;
use seditor::conversation::storage_key;

/// Write the stored pending change into the document
pub fn apply_command(work_dir: &Path, config: &Config, file: &Path) -> Result<()> {
    let path = super::resolve(work_dir, file);
    let store = super::conversation_store(config);
    let key = storage_key(Some(&path));
    let _lock = store.lock(&key)?;

    let Some(mut conversation) = store.load(&key)? else {
        println!("No conversation stored for {}", path.display());
        return Ok(());
    };
    let Some(change) = conversation.current_change().cloned() else {
        println!("No pending change for {}", path.display());
        return Ok(());
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    std::fs::write(&path, change.apply_to(&content))
        .with_context(|| format!("Failed to write document: {}", path.display()))?;

    conversation.mark_applied();
    store.save(&key, &conversation)?;
    println!("Applied change to {}", path.display());
    Ok(())
}

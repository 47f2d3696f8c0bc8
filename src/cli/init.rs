//! Init command implementation

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use seditor::config::Config;

/// Default configuration content for seditor init
pub const DEFAULT_CONFIG: &str = r#"# Seditor Configuration
# ======================
#
# Staged AI edits: every run plans, audits context, analyzes chunks,
# designs a strategy, generates the new document, validates it and
# explains the result.

# ============================================================================
# AI - Completion service
# ============================================================================
#
# Available options:
#   model        - Gemini model used for every stage (default: gemini-2.0-flash)
#   temperature  - Sampling temperature (default: 0.4)
#   top_p        - Nucleus sampling (default: 0.95)
#   api_key_env  - Environment variable holding the API key (default: GEMINI_API_KEY)
#   base_url     - Override the API endpoint (optional)

[ai]
model = "gemini-2.0-flash"
temperature = 0.4
top_p = 0.95
api_key_env = "GEMINI_API_KEY"

# ============================================================================
# PIPELINE - Stage tuning
# ============================================================================
#
# Available options:
#   pacing_ms           - Pause before each model stage in milliseconds (default: 0)
#   snapshot_chars      - Characters of the document shown to the generator (default: 8000)
#   repair_code_chars   - Characters of invalid code shown to the repair stage (default: 6000)
#   irrelevant_markers  - Phrases marking a chunk finding as irrelevant
#                         (matched ignoring case and accents)

[pipeline]
pacing_ms = 0
snapshot_chars = 8000
repair_code_chars = 6000
irrelevant_markers = ["not relevant", "tidak relevan"]

# ============================================================================
# STORAGE - Conversation history
# ============================================================================
#
# Available options:
#   conversation_dir - Where conversations are stored
#                      (default: <data dir>/seditor/conversations)

[storage]
"#;

/// Initialize a new seditor configuration.
/// By default creates .seditor/config.toml in the working directory.
/// Use --config to specify a custom path.
pub async fn init_command(work_dir: &Path, config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(|| Config::project_config_path(work_dir));

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    // Create parent directory (if any)
    if let Some(parent) = config_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    println!("Created: {}", config_path.display());

    Ok(())
}

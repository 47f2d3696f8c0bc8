//! CLI command implementations

pub mod apply;
pub mod history;
pub mod init;
pub mod profile;
pub mod run;

use anyhow::Result;
use std::path::{Path, PathBuf};

use seditor::config::Config;
use seditor::conversation::ConversationStore;

/// `--config` when given, else the working directory's project config
pub fn load_config(work_dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::from_file(path),
        None => Config::from_dir(work_dir),
    }
}

/// Document paths are relative to the working directory
pub fn resolve(work_dir: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        work_dir.join(file)
    }
}

pub fn conversation_store(config: &Config) -> ConversationStore {
    ConversationStore::new(config.storage.conversation_dir())
}

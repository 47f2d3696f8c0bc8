use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::Conversation;
use crate::config::write_locked;
use crate::session::SessionLock;

/// Key used when a conversation is not tied to a document
pub const GLOBAL_KEY: &str = "global";

/// Storage key for a document path: `file-<escaped path>` or [`GLOBAL_KEY`].
///
/// Every byte outside the RFC3986 unreserved set is percent-escaped, so two
/// different paths never share a key.
pub fn storage_key(document: Option<&Path>) -> String {
    let Some(path) = document else {
        return GLOBAL_KEY.to_string();
    };
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    format!("file-{}", escape_key_bytes(path.as_os_str().as_encoded_bytes()))
}

fn escape_key_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        let is_unreserved =
            matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~');
        if is_unreserved {
            out.push(b as char);
        } else {
            out.push('%');
            out.push_str(&format!("{:02X}", b));
        }
    }
    out
}

/// One JSON file per conversation key
#[derive(Debug, Clone)]
pub struct ConversationStore {
    dir: PathBuf,
}

impl ConversationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/seditor/conversations`
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("seditor")
            .join("conversations")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Claim `key` for a load, run and save cycle.
    ///
    /// The run lock is a separate file from the one `save` locks, so saving
    /// while holding it does not block.
    pub fn lock(&self, key: &str) -> Result<SessionLock> {
        SessionLock::try_acquire(&self.dir.join(format!("{}.run.lock", key)), key)
    }

    /// Load a conversation; `None` when nothing was stored under `key`
    pub fn load(&self, key: &str) -> Result<Option<Conversation>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read conversation: {}", path.display()))?;
        let conversation = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse conversation: {}", path.display()))?;
        Ok(Some(conversation))
    }

    /// Load a conversation, starting fresh when it is missing or unreadable
    pub fn load_or_default(&self, key: &str) -> Conversation {
        match self.load(key) {
            Ok(conversation) => conversation.unwrap_or_default(),
            Err(e) => {
                warn!("Discarding stored conversation {}: {:#}", key, e);
                Conversation::default()
            }
        }
    }

    pub fn save(&self, key: &str, conversation: &Conversation) -> Result<()> {
        let path = self.path_for(key);
        let content =
            serde_json::to_vec_pretty(conversation).with_context(|| "Failed to serialize conversation")?;
        write_locked(&path, &content)?;
        debug!("Saved conversation to {}", path.display());
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove conversation: {}", path.display()))?;
        }
        Ok(())
    }
}

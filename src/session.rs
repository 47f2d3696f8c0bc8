//! At most one pipeline run per session key.
//!
//! A session key is usually the document path. Starting a second run for a
//! key that is still busy fails with [`PipelineError::SessionBusy`]; the
//! [`RunGuard`] frees the key when dropped, including when the run future is
//! dropped mid-flight.
//!
//! [`SessionRegistry`] only sees runs inside one process. [`SessionLock`]
//! holds an exclusive lock file instead, so separate processes working on
//! the same key exclude each other too.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use fs2::FileExt;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::pipeline::PipelineError;

static GLOBAL: Lazy<SessionRegistry> = Lazy::new(SessionRegistry::new);

/// Registry shared by every run in this process
pub fn global() -> &'static SessionRegistry {
    &GLOBAL
}

/// Set of keys with a run in flight
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    active: Arc<Mutex<HashSet<String>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key` for a run
    pub fn try_begin(&self, key: impl Into<String>) -> Result<RunGuard, PipelineError> {
        let key = key.into();
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(key.clone()) {
            return Err(PipelineError::SessionBusy(key));
        }
        debug!("Session {} started", key);
        Ok(RunGuard {
            key,
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_busy(&self, key: &str) -> bool {
        let active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.contains(key)
    }
}

/// Releases its session key on drop
#[derive(Debug)]
pub struct RunGuard {
    key: String,
    active: Arc<Mutex<HashSet<String>>>,
}

impl RunGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.remove(&self.key);
        debug!("Session {} released", self.key);
    }
}

/// Cross-process claim on a session key, held until dropped
#[derive(Debug)]
pub struct SessionLock {
    key: String,
    path: PathBuf,
    file: File,
}

impl SessionLock {
    /// Take the exclusive lock on `path` without waiting.
    ///
    /// Fails with [`PipelineError::SessionBusy`] when another holder has it.
    pub fn try_acquire(path: &Path, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to create lock file: {}", path.display()))?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.kind() == fs2::lock_contended_error().kind() {
                return Err(PipelineError::SessionBusy(key).into());
            }
            return Err(e).with_context(|| format!("Failed to acquire lock: {}", path.display()));
        }

        debug!("Session lock {} taken", path.display());
        Ok(Self {
            key,
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!("Session lock {} released", self.path.display());
    }
}

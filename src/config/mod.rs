//! Configuration loading and management

mod io;

pub(crate) use io::write_locked;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::GenerationOptions;
use crate::pipeline::PipelineSettings;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Completion service settings
    #[serde(default)]
    pub ai: AiSettings,

    /// Pipeline tunables
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Conversation storage
    #[serde(default)]
    pub storage: StorageConfig,
}

/// `[ai]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSettings {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Override for the service base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_model() -> String {
    GenerationOptions::default().model
}

fn default_temperature() -> f64 {
    GenerationOptions::default().temperature
}

fn default_top_p() -> f64 {
    GenerationOptions::default().top_p
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            api_key_env: default_api_key_env(),
            base_url: None,
        }
    }
}

impl AiSettings {
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            model: self.model.clone(),
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// `[pipeline]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Delay before each model stage, in milliseconds
    #[serde(default)]
    pub pacing_ms: u64,

    #[serde(default = "default_snapshot_chars")]
    pub snapshot_chars: usize,

    #[serde(default = "default_repair_code_chars")]
    pub repair_code_chars: usize,

    /// Phrases that mark a chunk summary as irrelevant
    #[serde(default = "default_irrelevant_markers")]
    pub irrelevant_markers: Vec<String>,
}

fn default_snapshot_chars() -> usize {
    PipelineSettings::default().snapshot_chars
}

fn default_repair_code_chars() -> usize {
    PipelineSettings::default().repair_code_chars
}

fn default_irrelevant_markers() -> Vec<String> {
    PipelineSettings::default().irrelevant_markers
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pacing_ms: 0,
            snapshot_chars: default_snapshot_chars(),
            repair_code_chars: default_repair_code_chars(),
            irrelevant_markers: default_irrelevant_markers(),
        }
    }
}

/// `[storage]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where conversations are kept; defaults to the platform data dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn conversation_dir(&self) -> PathBuf {
        self.conversation_dir
            .clone()
            .unwrap_or_else(crate::conversation::ConversationStore::default_dir)
    }
}

impl Config {
    /// Path of the project config inside `dir`
    pub fn project_config_path(dir: &Path) -> PathBuf {
        dir.join(".seditor").join("config.toml")
    }

    /// Load `.seditor/config.toml` from a directory, or defaults when absent
    pub fn from_dir(dir: &Path) -> anyhow::Result<Self> {
        let path = Self::project_config_path(dir);
        if path.exists() {
            return Self::from_file(&path);
        }
        Ok(Self::default())
    }

    /// Settings for a [`crate::pipeline::PipelineRunner`]
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            pacing: Duration::from_millis(self.pipeline.pacing_ms),
            snapshot_chars: self.pipeline.snapshot_chars,
            repair_code_chars: self.pipeline.repair_code_chars,
            irrelevant_markers: self.pipeline.irrelevant_markers.clone(),
            generation: self.ai.generation_options(),
        }
    }
}

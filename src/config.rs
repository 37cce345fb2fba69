//! Project configuration for the stop gate.
//!
//! The optional `.claude/worktree-guard.yaml` file stores per-project
//! settings. A missing file means defaults; a malformed file is an error the
//! caller is expected to fail open on.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file path relative to the worktree root.
pub const CONFIG_FILE_PATH: &str = ".claude/worktree-guard.yaml";

/// Project configuration for the stop gate.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GuardConfig {
    /// Whether to append hook events to the debug JSONL log.
    #[serde(default)]
    pub debug_logging: bool,

    /// Override for the status document path, relative to the worktree root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_file: Option<String>,
}

impl GuardConfig {
    /// Load config from a worktree root, returning defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(base_dir: &Path) -> Result<Self> {
        let config_path = base_dir.join(CONFIG_FILE_PATH);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save config under a worktree root, creating `.claude/` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, base_dir: &Path) -> Result<()> {
        let config_path = base_dir.join(CONFIG_FILE_PATH);
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Resolve the status document path relative to the worktree root.
    #[must_use]
    pub fn status_file_path(&self, base_dir: &Path) -> std::path::PathBuf {
        base_dir.join(self.status_file.as_deref().unwrap_or(crate::progress::STATUS_FILE_PATH))
    }
}

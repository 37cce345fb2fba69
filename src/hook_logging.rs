//! Debug hook event logging.
//!
//! When `debug_logging` is enabled in the project config, every hook
//! invocation is appended as a JSONL line to
//! `.worktree-guard/hook-events.jsonl`. Errors are silently ignored; logging
//! must never break hook execution.

use crate::config::GuardConfig;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Data directory for hook artifacts, relative to the worktree root.
const DATA_DIR: &str = ".worktree-guard";

/// Log file name within the data directory.
const HOOK_EVENTS_FILE: &str = "hook-events.jsonl";

/// Resolve the hook data directory under a worktree root.
#[must_use]
pub fn data_dir(base_dir: &Path) -> PathBuf {
    base_dir.join(DATA_DIR)
}

/// Log a hook event in a specific base directory if debug logging is enabled.
pub fn log_hook_event(hook_type: &str, raw_input: &str, base_dir: &Path) {
    let Ok(config) = GuardConfig::load_from(base_dir) else {
        return;
    };

    if !config.debug_logging {
        return;
    }

    write_hook_event(hook_type, raw_input, base_dir);
}

/// Write the hook event to the log file.
fn write_hook_event(hook_type: &str, raw_input: &str, base_dir: &Path) {
    let dir = data_dir(base_dir);

    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }

    let log_path = dir.join(HOOK_EVENTS_FILE);

    let timestamp = chrono::Utc::now().to_rfc3339();

    // Embed valid JSON input as-is, anything else as a string.
    let input_value: serde_json::Value = serde_json::from_str(raw_input)
        .unwrap_or_else(|_| serde_json::Value::String(raw_input.to_string()));

    let entry = serde_json::json!({
        "timestamp": timestamp,
        "hook_type": hook_type,
        "input": input_value,
    });

    let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };

    let _ = writeln!(file, "{entry}");
}

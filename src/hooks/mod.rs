//! Hook wire format: stdin payload and stdout decision record.

mod stop;

pub use stop::{run_stop_gate, InvocationContext, StopOutcome, WORKTREES_SEGMENT};

use serde::{Deserialize, Serialize};

/// Input provided to hooks on stdin by the host session.
///
/// All fields are diagnostic; the stop gate's decision does not depend on any
/// of them. Malformed input is treated as an empty payload.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HookInput {
    /// Session identifier.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Path to the transcript file.
    #[serde(default)]
    pub transcript_path: Option<String>,
    /// The hook event name (e.g. `Stop`).
    #[serde(default)]
    pub hook_event_name: Option<String>,
    /// Whether a stop hook is already active for this session.
    #[serde(default)]
    pub stop_hook_active: Option<bool>,
}

/// Parse hook input from stdin, treating empty or malformed JSON as an empty
/// payload.
#[must_use]
pub fn parse_hook_input(input: &str) -> HookInput {
    if input.trim().is_empty() {
        return HookInput::default();
    }
    serde_json::from_str(input).unwrap_or_default()
}

/// The structured record emitted on stdout when the stop is blocked.
#[derive(Debug, Clone, Serialize)]
pub struct StopOutput {
    /// Decision discriminator; always the literal `block`.
    pub decision: &'static str,
    /// Instructional body relayed to the agent (markdown).
    pub reason: String,
}

impl StopOutput {
    /// Create a block record with the given instructional body.
    #[must_use]
    pub fn block(reason: impl Into<String>) -> Self {
        Self { decision: "block", reason: reason.into() }
    }

    /// Serialize to the JSON emitted on stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

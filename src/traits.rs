//! Core traits for testability and abstraction.

use crate::error::Result;
use std::time::Duration;

/// Output from a command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// The exit code of the command.
    pub exit_code: i32,
    /// The stdout output.
    pub stdout: String,
    /// The stderr output.
    pub stderr: String,
}

impl CommandOutput {
    /// Check if the command succeeded (exit code 0).
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Get the trimmed stdout, or an empty string if the command failed.
    #[must_use]
    pub fn stdout_if_success(&self) -> &str {
        if self.success() {
            self.stdout.trim()
        } else {
            ""
        }
    }
}

/// Trait for running shell commands.
///
/// This trait abstracts command execution so the decision procedure can be
/// exercised in tests without a real git installation.
pub trait CommandRunner {
    /// Run a command with the given arguments and timeout.
    ///
    /// # Arguments
    ///
    /// * `program` - The program to run.
    /// * `args` - The arguments to pass.
    /// * `timeout` - Optional timeout duration.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned or exceeds the
    /// timeout.
    fn run(&self, program: &str, args: &[&str], timeout: Option<Duration>)
        -> Result<CommandOutput>;
}

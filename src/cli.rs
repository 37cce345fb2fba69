//! CLI functionality for the worktree-guard hook.
//!
//! This module holds the command-line logic so the binary can stay a thin
//! wrapper. The `stop` command carries the fail-open contract: any internal
//! error maps to an allow outcome plus a single diagnostic line on stderr,
//! and the exit code is always a success code.

use crate::command::RealCommandRunner;
use crate::config::GuardConfig;
use crate::hook_logging;
use crate::hooks::{parse_hook_input, run_stop_gate, InvocationContext, StopOutcome, StopOutput};
use crate::traits::CommandRunner;
use std::process::ExitCode;

/// CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Show version information.
    Version,
    /// Run the stop gate.
    Stop,
}

impl Command {
    /// Whether this command reads a payload from stdin.
    #[must_use]
    pub const fn needs_stdin(self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// Result of parsing CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult {
    /// Successfully parsed a command.
    Command(Command),
    /// Show usage (no args provided).
    ShowUsage,
    /// Unknown command.
    UnknownCommand(String),
}

/// Parse CLI arguments into a command.
#[must_use]
pub fn parse_args(args: &[String]) -> ParseResult {
    if args.len() < 2 {
        return ParseResult::ShowUsage;
    }

    match args[1].as_str() {
        "version" | "--version" | "-v" => ParseResult::Command(Command::Version),
        "stop" => ParseResult::Command(Command::Stop),
        other => ParseResult::UnknownCommand(other.to_string()),
    }
}

/// Get the usage string.
#[must_use]
pub fn usage(program: &str) -> String {
    format!(
        "Usage: {program} <command>\n\n\
         Commands:\n  \
         stop     Run the stop gate (reads hook JSON from stdin)\n  \
         version  Show version information"
    )
}

/// Everything one CLI invocation produces.
#[derive(Debug)]
pub struct CliOutput {
    /// Process exit code.
    pub exit_code: i32,
    /// Payload for stdout (the block decision record), if any.
    pub stdout: Option<String>,
    /// Diagnostic messages for stderr.
    pub messages: Vec<String>,
}

impl CliOutput {
    fn allow() -> Self {
        Self { exit_code: 0, stdout: None, messages: Vec::new() }
    }

    fn block(json: String) -> Self {
        Self { exit_code: 0, stdout: Some(json), messages: Vec::new() }
    }

    fn fail_open(error: &impl std::fmt::Display) -> Self {
        Self {
            exit_code: 0,
            stdout: None,
            messages: vec![format!("worktree-guard: internal error, allowing stop: {error}")],
        }
    }

    fn error(message: String) -> Self {
        Self { exit_code: 1, stdout: None, messages: vec![message] }
    }
}

/// Convert the i32 exit code to `ExitCode`, clamping to the valid range.
#[must_use]
pub fn exit_code_from_i32(code: i32) -> ExitCode {
    let code_u8 = u8::try_from(code).unwrap_or(if code < 0 { 1 } else { u8::MAX });
    ExitCode::from(code_u8)
}

/// Run the CLI with parsed arguments and stdin input.
#[must_use]
pub fn run(args: &[String], stdin: &str) -> CliOutput {
    match parse_args(args) {
        ParseResult::ShowUsage => CliOutput::error(usage(&args[0])),
        ParseResult::UnknownCommand(cmd) => CliOutput::error(format!("Unknown command: {cmd}")),
        ParseResult::Command(Command::Version) => CliOutput {
            exit_code: 0,
            stdout: None,
            messages: vec![format!("worktree-guard v{}", crate::VERSION)],
        },
        ParseResult::Command(Command::Stop) => {
            let ctx = InvocationContext::from_env();
            let runner = RealCommandRunner::new();
            run_stop(stdin, &ctx, &runner)
        }
    }
}

/// Run the stop gate against an explicit context and runner.
///
/// This is the testable core of the `stop` command; every failure path maps
/// to the allow outcome.
pub fn run_stop(stdin: &str, ctx: &InvocationContext, runner: &dyn CommandRunner) -> CliOutput {
    hook_logging::log_hook_event("stop", stdin, &ctx.cwd);

    let input = parse_hook_input(stdin);

    let config = match GuardConfig::load_from(&ctx.cwd) {
        Ok(config) => config,
        Err(e) => return CliOutput::fail_open(&e),
    };

    match run_stop_gate(ctx, &input, &config, runner) {
        Ok(StopOutcome::Allow) => CliOutput::allow(),
        Ok(StopOutcome::Block(reason)) => match StopOutput::block(reason).to_json() {
            Ok(json) => CliOutput::block(json),
            Err(e) => CliOutput::fail_open(&e),
        },
        Err(e) => CliOutput::fail_open(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCommandRunner;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_parse_args_stop() {
        assert_eq!(parse_args(&args(&["prog", "stop"])), ParseResult::Command(Command::Stop));
    }

    #[test]
    fn test_parse_args_version_aliases() {
        for flag in ["version", "--version", "-v"] {
            assert_eq!(
                parse_args(&args(&["prog", flag])),
                ParseResult::Command(Command::Version)
            );
        }
    }

    #[test]
    fn test_parse_args_no_args() {
        assert_eq!(parse_args(&args(&["prog"])), ParseResult::ShowUsage);
    }

    #[test]
    fn test_parse_args_unknown() {
        assert_eq!(
            parse_args(&args(&["prog", "bogus"])),
            ParseResult::UnknownCommand("bogus".to_string())
        );
    }

    #[test]
    fn test_needs_stdin() {
        assert!(Command::Stop.needs_stdin());
        assert!(!Command::Version.needs_stdin());
    }

    #[test]
    fn test_exit_code_from_i32() {
        // Spot-check clamping; ExitCode itself is opaque.
        let _ = exit_code_from_i32(0);
        let _ = exit_code_from_i32(-1);
        let _ = exit_code_from_i32(300);
    }

    #[test]
    fn test_run_version() {
        let out = run(&args(&["prog", "version"]), "");
        assert_eq!(out.exit_code, 0);
        assert!(out.messages[0].contains(crate::VERSION));
    }

    #[test]
    fn test_run_unknown_command_fails() {
        let out = run(&args(&["prog", "bogus"]), "");
        assert_eq!(out.exit_code, 1);
    }

    #[test]
    fn test_run_stop_invalid_stdin_still_allows() {
        // Unscoped context: the gate allows without consulting git.
        let dir = TempDir::new().unwrap();
        let ctx = InvocationContext::new(dir.path().to_path_buf(), None);
        let runner = MockCommandRunner::new();

        let out = run_stop("not json at all {", &ctx, &runner);
        assert_eq!(out.exit_code, 0);
        assert!(out.stdout.is_none());
        assert!(out.messages.is_empty());
        runner.verify();
    }

    #[test]
    fn test_run_stop_malformed_config_fails_open() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".claude")).unwrap();
        std::fs::write(
            dir.path().join(crate::config::CONFIG_FILE_PATH),
            ": not valid yaml [",
        )
        .unwrap();
        let ctx = InvocationContext::new(
            dir.path().to_path_buf(),
            Some(format!("{}/.worktrees/task", dir.path().display())),
        );
        let runner = MockCommandRunner::new();

        let out = run_stop("{}", &ctx, &runner);
        assert_eq!(out.exit_code, 0);
        assert!(out.stdout.is_none());
        assert_eq!(out.messages.len(), 1);
        assert!(out.messages[0].contains("allowing stop"));
    }

    #[test]
    fn test_run_stop_main_repo_allows() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let ctx = InvocationContext::new(
            dir.path().to_path_buf(),
            Some(format!("{}/.worktrees/task", dir.path().display())),
        );
        let runner = MockCommandRunner::new();

        let out = run_stop("{}", &ctx, &runner);
        assert_eq!(out.exit_code, 0);
        assert!(out.stdout.is_none());
    }

    #[test]
    #[serial_test::serial]
    fn test_run_stop_block_emits_decision_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".git"), "gitdir: /repo/.git/worktrees/task\n").unwrap();
        let status_path = dir.path().join(crate::progress::STATUS_FILE_PATH);
        std::fs::create_dir_all(status_path.parent().unwrap()).unwrap();
        std::fs::write(&status_path, "## Status\n**Completed**\n").unwrap();

        let ctx = InvocationContext::new(
            dir.path().to_path_buf(),
            Some(format!("{}/.worktrees/task", dir.path().display())),
        );
        let mut runner = MockCommandRunner::new();
        runner.expect(
            "git",
            &["ls-files", "--others", "--exclude-standard"],
            crate::traits::CommandOutput {
                exit_code: 0,
                stdout: "leftover.txt\n".to_string(),
                stderr: String::new(),
            },
        );
        runner.expect(
            "git",
            &["diff", "--name-only"],
            crate::traits::CommandOutput::default(),
        );
        runner.expect(
            "git",
            &["diff", "--cached", "--name-only"],
            crate::traits::CommandOutput::default(),
        );

        crate::templates::reset_cache().unwrap();
        let out = run_stop("{}", &ctx, &runner);
        assert_eq!(out.exit_code, 0);
        let json = out.stdout.expect("block decision on stdout");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["decision"], "block");
        assert!(value["reason"].as_str().unwrap().contains("commit"));
    }

    #[test]
    fn test_invocation_context_is_explicit() {
        // The decision function never consults the environment directly.
        let ctx = InvocationContext::new(PathBuf::from("/tmp/x"), Some("x".to_string()));
        assert_eq!(ctx.cwd, PathBuf::from("/tmp/x"));
    }
}

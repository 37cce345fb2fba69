//! Real command execution with a bounded timeout.

use crate::error::{Error, Result};
use crate::traits::{CommandOutput, CommandRunner};
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// How often to poll a running child while waiting for the timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Real command runner that executes shell commands.
///
/// Commands are run non-interactively (stdin closed) with captured output.
/// When a timeout is given, the child is polled and killed once the deadline
/// passes; callers that want fail-open behavior treat the timeout error as an
/// empty result.
#[derive(Debug, Default, Clone)]
pub struct RealCommandRunner;

impl RealCommandRunner {
    /// Create a new command runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Drain a child output stream on a background thread.
///
/// The pipes must be drained while the child runs, or a child producing more
/// than the OS pipe buffer blocks on a full pipe and never exits.
fn drain<R: Read + Send + 'static>(stream: Option<R>) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

impl CommandRunner for RealCommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());

        let status = if let Some(limit) = timeout {
            let deadline = Instant::now() + limit;
            loop {
                if let Some(status) = child.try_wait()? {
                    break status;
                }
                if Instant::now() >= deadline {
                    // Reap the child so it doesn't linger as a zombie; killing
                    // it closes the pipes and lets the reader threads finish.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::CommandTimeout {
                        command: format!("{program} {}", args.join(" ")),
                        timeout_secs: limit.as_secs(),
                    });
                }
                std::thread::sleep(POLL_INTERVAL);
            }
        } else {
            child.wait()?
        };

        let exit_code = status.code().unwrap_or(-1);
        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        Ok(CommandOutput { exit_code, stdout, stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_echo() {
        let runner = RealCommandRunner::new();
        let output = runner.run("echo", &["hello"], None).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn test_run_failing_command() {
        let runner = RealCommandRunner::new();
        let output = runner.run("false", &[], None).unwrap();
        assert!(!output.success());
        assert_ne!(output.exit_code, 0);
    }

    #[test]
    fn test_run_nonexistent_command() {
        let runner = RealCommandRunner::new();
        let result = runner.run("definitely_not_a_real_command_12345", &[], None);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_within_timeout() {
        let runner = RealCommandRunner::new();
        let output = runner.run("echo", &["fast"], Some(Duration::from_secs(5))).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "fast");
    }

    #[test]
    fn test_run_large_output_within_timeout() {
        // Output well past the OS pipe buffer must not stall the child.
        let runner = RealCommandRunner::new();
        let output = runner
            .run(
                "sh",
                &["-c", "head -c 262144 /dev/zero | tr '\\0' 'a'"],
                Some(Duration::from_secs(5)),
            )
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.len(), 262_144);
    }

    #[test]
    fn test_run_large_stderr_within_timeout() {
        let runner = RealCommandRunner::new();
        let output = runner
            .run(
                "sh",
                &["-c", "head -c 262144 /dev/zero | tr '\\0' 'b' >&2"],
                Some(Duration::from_secs(5)),
            )
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stderr.len(), 262_144);
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn test_run_exceeds_timeout() {
        let runner = RealCommandRunner::new();
        let result = runner.run("sleep", &["5"], Some(Duration::from_millis(100)));
        match result {
            Err(Error::CommandTimeout { command, .. }) => {
                assert!(command.starts_with("sleep"));
            }
            other => panic!("expected timeout error, got {other:?}"),
        }
    }
}

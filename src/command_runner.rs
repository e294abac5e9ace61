//! Abstraction over external command execution for testability.
//!
//! Every external engine (`terraform`, `helm`, `kubectl`) is invoked through the
//! [`CommandRunner`] trait so the adapters in [`crate::terraform`],
//! [`crate::helm`] and [`crate::verify`] can be tested without spawning
//! subprocesses.
//!
//! [`RealCommandRunner`] delegates to [`std::process::Command`].
//! [`RecordingRunner`] (test only) records every call and replays canned
//! responses.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output};

/// Trait for abstracting external command execution.
///
/// Stored as `Arc<dyn CommandRunner>` by the engine adapters. The two methods
/// cover all usage patterns:
/// - [`run_output`](CommandRunner::run_output): captures stdout + stderr + exit status
/// - [`run_status`](CommandRunner::run_status): inherits stdio, returns only exit status
pub trait CommandRunner: Send + Sync {
    /// Run a command and capture its full output (stdout + stderr + exit status).
    fn run_output(&self, program: &str, args: &[&str], options: &CommandOptions) -> Result<Output>;

    /// Run a command and return only its exit status (inherits stdio).
    ///
    /// Used for long engine runs in verbose mode so the operator sees the
    /// engine's own progress output.
    fn run_status(
        &self,
        program: &str,
        args: &[&str],
        options: &CommandOptions,
    ) -> Result<ExitStatus>;
}

/// Options for command execution.
#[derive(Debug, Default, Clone)]
pub struct CommandOptions {
    /// Working directory for the command.
    pub cwd: Option<PathBuf>,
    /// Additional environment variables.
    pub env: Vec<(String, String)>,
}

impl CommandOptions {
    /// Create options with a working directory.
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            ..Default::default()
        }
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Production implementation that delegates to [`std::process::Command`].
pub struct RealCommandRunner;

impl RealCommandRunner {
    fn command(program: &str, args: &[&str], options: &CommandOptions) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }
        for (k, v) in &options.env {
            cmd.env(k, v);
        }
        cmd
    }
}

impl CommandRunner for RealCommandRunner {
    fn run_output(&self, program: &str, args: &[&str], options: &CommandOptions) -> Result<Output> {
        tracing::debug!(program, ?args, cwd = ?options.cwd, "running command");
        Self::command(program, args, options)
            .output()
            .with_context(|| format!("Failed to run '{program}'"))
    }

    fn run_status(
        &self,
        program: &str,
        args: &[&str],
        options: &CommandOptions,
    ) -> Result<ExitStatus> {
        tracing::debug!(program, ?args, cwd = ?options.cwd, "running command");
        Self::command(program, args, options)
            .status()
            .with_context(|| format!("Failed to run '{program}'"))
    }
}

/// Combine stderr (or stdout when stderr is empty) into one trimmed message.
pub fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();
    if !stdout.is_empty() {
        return stdout.to_string();
    }
    format!("exited with {}", output.status)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_command_options_default() {
        let opts = CommandOptions::default();
        assert!(opts.cwd.is_none());
        assert!(opts.env.is_empty());
    }

    #[test]
    fn test_command_options_with_cwd_and_env() {
        let opts = CommandOptions::with_cwd("/tmp").env("TF_IN_AUTOMATION", "1");
        assert_eq!(opts.cwd.as_ref().unwrap().to_str().unwrap(), "/tmp");
        assert_eq!(opts.env, vec![("TF_IN_AUTOMATION".into(), "1".into())]);
    }

    #[test]
    fn test_real_runner_output() {
        let runner = RealCommandRunner;
        let output = runner
            .run_output("echo", &["hello"], &CommandOptions::default())
            .unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[test]
    fn test_real_runner_status() {
        let runner = RealCommandRunner;
        let status = runner
            .run_status("true", &[], &CommandOptions::default())
            .unwrap();
        assert!(status.success());
    }

    #[test]
    fn test_failure_message_prefers_stderr() {
        let runner = RecordingRunner::new();
        runner.respond("terraform", Response::fail("  boom\n"));
        let output = runner
            .run_output("terraform", &["apply"], &CommandOptions::default())
            .unwrap();
        assert!(!output.status.success());
        assert_eq!(failure_message(&output), "boom");
    }

    #[test]
    fn test_recording_runner_queues_responses() {
        let runner = RecordingRunner::new();
        runner.respond("output", Response::ok("{}"));
        runner.respond("output", Response::ok("{\"a\":1}"));

        let opts = CommandOptions::default();
        let first = runner.run_output("terraform", &["output"], &opts).unwrap();
        let second = runner.run_output("terraform", &["output"], &opts).unwrap();
        let third = runner.run_output("terraform", &["output"], &opts).unwrap();

        assert_eq!(first.stdout, b"{}");
        assert_eq!(second.stdout, b"{\"a\":1}");
        assert_eq!(third.stdout, b"{\"a\":1}");
        assert_eq!(runner.lines().len(), 3);
    }
}

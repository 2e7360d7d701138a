//! External command execution
//!
//! Every subprocess the tool starts goes through a [`CommandRunner`]. The
//! system implementation blocks until the child exits, draws a spinner
//! meanwhile and logs argv plus stderr when the exit status is non-zero.
//! Failure is reported through [`ExecutionResult::success`], never as an
//! error: callers keep going with their remaining work.
//!
//! Steps never call `Command::new` themselves: going through the trait keeps
//! children in their own process group and lets tests substitute a recorder.

use crate::process_guard::{ProcessGroupExt, RunningCommands};
use crate::spinner::Spinner;
use std::process::{Command, Stdio};
use tracing::{error, info};

/// One external command: argv plus a human-readable description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub argv: Vec<String>,
    pub description: String,
}

impl CommandInvocation {
    pub fn new<I, S>(argv: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            description: description.into(),
        }
    }

    /// argv joined with spaces, for logs and notices
    pub fn display_command(&self) -> String {
        self.argv.join(" ")
    }
}

/// Outcome of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// True exactly when the child exited with status 0
    pub success: bool,
    /// Exit code (None if terminated by a signal or never started)
    pub exit_code: Option<i32>,
    /// Captured standard error, or the spawn error text
    pub stderr: String,
}

impl ExecutionResult {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            stderr: String::new(),
        }
    }

    pub fn failed(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code,
            stderr: stderr.into(),
        }
    }
}

/// Executes external commands on behalf of the steps
pub trait CommandRunner {
    /// Run the invocation to completion. Must not panic or return early on
    /// failure; failures are encoded in the result.
    fn run(&self, invocation: &CommandInvocation) -> ExecutionResult;
}

/// Runs real processes
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    dry_run: bool,
    progress: bool,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self {
            dry_run: false,
            progress: true,
        }
    }

    /// Print commands instead of executing them
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Draw a spinner while commands run
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    fn execute(&self, invocation: &CommandInvocation) -> ExecutionResult {
        let Some((program, args)) = invocation.argv.split_first() else {
            return ExecutionResult::failed(None, "empty command");
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .own_process_group();

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return ExecutionResult::failed(None, format!("failed to spawn {program}: {e}")),
        };
        let pid = child.id();

        if !RunningCommands::lock().track(pid, &invocation.description) {
            // Shutdown already under way
            let _ = child.kill();
            let _ = child.wait();
            return ExecutionResult::failed(None, "interrupted before start");
        }

        let output = {
            let _spinner = self.progress.then(|| Spinner::start(&invocation.description));
            child.wait_with_output()
        };

        RunningCommands::lock().release(pid);

        match output {
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                if output.status.success() {
                    ExecutionResult {
                        success: true,
                        exit_code: output.status.code(),
                        stderr,
                    }
                } else {
                    ExecutionResult::failed(output.status.code(), stderr)
                }
            }
            Err(e) => ExecutionResult::failed(None, format!("failed waiting for {program}: {e}")),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &CommandInvocation) -> ExecutionResult {
        let command = invocation.display_command();

        if self.dry_run {
            info!(%command, "dry-run: skipping execution");
            println!("[dry-run] {command}");
            return ExecutionResult::succeeded();
        }

        info!(%command, description = %invocation.description, "running command");
        let result = self.execute(invocation);

        if !result.success {
            error!("Command failed: {command}");
            error!("Error: {}", result.stderr.trim_end());
        }

        result
    }
}

//! External program execution.
//!
//! Every external tool the provisioner touches (the runtime, its package
//! manager, downloaded installers) is started through a [`CommandRunner`]
//! so that plans can be driven against a scripted runner in tests.

use crate::error::{ProvisionError, Result};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Result of executing an external program.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the program exited with code 0.
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: stderr.into(),
            duration: Duration::ZERO,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            duration: Duration::ZERO,
            success: false,
        }
    }

    /// Stdout and stderr joined, for diagnostics.
    pub fn combined_output(&self) -> String {
        match (self.stdout.trim(), self.stderr.trim()) {
            ("", "") => String::new(),
            (out, "") => out.to_string(),
            ("", err) => err.to_string(),
            (out, err) => format!("{}\n{}", out, err),
        }
    }
}

/// Runs external programs to completion.
///
/// Implementations block until the program exits. An `Err` means the
/// program could not be started at all; a program that ran and failed is
/// an `Ok` result with `success == false`.
pub trait CommandRunner {
    /// Run `program` with `args` and capture its output.
    fn run(&self, program: &str, args: &[String]) -> Result<CommandResult>;
}

/// Runs programs as child processes of the current process.
///
/// Programs are resolved against the process `PATH` at spawn time, so a
/// refreshed `PATH` is honoured by every later invocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a process runner.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandResult> {
        let start = Instant::now();
        tracing::debug!("Running: {}", display_command(program, args));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ProvisionError::CommandFailed {
                program: program.to_string(),
                message: e.to_string(),
            })?;

        let duration = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        let mut result = if output.status.success() {
            CommandResult::success(stdout, stderr)
        } else {
            CommandResult::failure(output.status.code(), stdout, stderr)
        };
        result.duration = duration;

        tracing::debug!(
            "{} exited with {:?} after {:?}",
            program,
            result.exit_code,
            duration
        );
        Ok(result)
    }
}

/// Render a program and its arguments as a single display line.
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut line = quote_arg(program);
    for arg in args {
        line.push(' ');
        line.push_str(&quote_arg(arg));
    }
    line
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}

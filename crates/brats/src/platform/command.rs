// crates/brats/src/platform/command.rs
// ============================================================================
// Module: Command Runner
// Description: Process invocation seam for the platform CLI and packager.
// Purpose: Run external programs with captured output and typed failures.
// Dependencies: std::process, tracing
// ============================================================================

//! Helpers for invoking external CLIs.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use crate::error::PlatformError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to run.
    pub program: String,
    /// Arguments.
    pub args: Vec<String>,
    /// Working directory, when not inherited.
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    /// Builds an invocation of `program` with `args`.
    #[must_use]
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    /// Sets the working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Whether the process exited successfully.
    pub success: bool,
    /// Exit status description.
    pub status: String,
    /// Captured stdout (lossy UTF-8).
    pub stdout: String,
    /// Captured stderr (lossy UTF-8).
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            status: "exit status: 0".to_string(),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runs external programs.
pub trait CommandRunner {
    /// Runs the invocation to completion and captures its output.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Spawn`] when the program cannot be started.
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, PlatformError>;
}

/// Runs programs as child processes of the test process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput, PlatformError> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(dir) = &invocation.cwd {
            command.current_dir(dir);
        }
        tracing::debug!(command = %invocation, "running command");
        let output = command.output().map_err(|source| PlatformError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;
        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs the invocation and fails on a non-zero exit.
///
/// # Errors
///
/// Returns [`PlatformError::CommandFailed`] carrying stderr (or stdout when
/// stderr is empty) for unsuccessful exits.
pub fn run_checked<R: CommandRunner + ?Sized>(
    runner: &R,
    invocation: &Invocation,
) -> Result<CommandOutput, PlatformError> {
    let output = runner.run(invocation)?;
    if output.success {
        return Ok(output);
    }
    let detail = if output.stderr.trim().is_empty() { &output.stdout } else { &output.stderr };
    Err(PlatformError::CommandFailed {
        command: invocation.to_string(),
        status: output.status.clone(),
        stderr: detail.trim().to_string(),
    })
}

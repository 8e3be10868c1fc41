//! External process execution and exit classification.
//!
//! - [`CommandExecutor`]: capability to run a command and capture its streams
//! - [`PgBackRestExecutor`]: real subprocess-backed implementation
//! - [`classify`]: maps a finished invocation to a pipeline decision

use std::io;

/// Captured result of one tool invocation.
///
/// Raw streams plus exit status, produced by a [`CommandExecutor`] and
/// consumed once by [`classify`]. `code` is `None` when the process was
/// terminated by a signal.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub code: Option<i32>,
}

impl ProcessOutput {
    /// Stderr as text with the trailing newline stripped.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim_end().to_string()
    }

    /// Human-readable exit status, e.g. `exit status 29`.
    pub fn status_display(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Capability to execute an external command.
///
/// The orchestrator only ever talks to this trait, so tests substitute an
/// implementation returning canned streams and status without spawning a
/// real process.
#[async_trait::async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `program` with `args`, capturing both output streams to completion.
    ///
    /// Implementations must not interpret the payload.
    async fn run(&self, program: &str, args: &[String]) -> io::Result<ProcessOutput>;
}

/// Executor backed by a real subprocess.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgBackRestExecutor;

#[async_trait::async_trait]
impl CommandExecutor for PgBackRestExecutor {
    async fn run(&self, program: &str, args: &[String]) -> io::Result<ProcessOutput> {
        let output = tokio::process::Command::new(program)
            .args(args)
            .output()
            .await?;

        Ok(ProcessOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            code: output.status.code(),
        })
    }
}

/// Pipeline decision derived from a finished invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Exit 0, empty stderr.
    Clean,
    /// Exit 0 with diagnostics on stderr. pgBackRest reports non-fatal
    /// configuration notices this way even on success.
    Warning(String),
    /// Non-zero exit status or signal termination.
    Failure { status: String, stderr: String },
}

/// Classify an invocation result. Stderr content only matters on success;
/// on failure it becomes the error detail.
pub fn classify(output: &ProcessOutput) -> Classification {
    let stderr = output.stderr_text();
    match output.code {
        Some(0) if stderr.is_empty() => Classification::Clean,
        Some(0) => Classification::Warning(stderr),
        _ => Classification::Failure {
            status: output.status_display(),
            stderr,
        },
    }
}

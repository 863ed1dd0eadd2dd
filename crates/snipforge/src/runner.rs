//! Synchronous execution of built snippets.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{SnippetError, SnippetResult};

/// Captured result of one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Exit code, `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    /// Whether the process exited successfully.
    pub success: bool,
    /// Trimmed stdout, lossily decoded as UTF-8.
    pub stdout: String,
    /// Trimmed stderr, lossily decoded as UTF-8.
    pub stderr: String,
}

/// Runs `binary` with no arguments and waits for it to exit.
///
/// There is no timeout: a snippet that never exits blocks the caller.
pub fn run_executable(binary: &Path) -> SnippetResult<ExecutionOutcome> {
    tracing::debug!(binary = %binary.display(), "running snippet");

    let output = Command::new(binary)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| SnippetError::SpawnFailed {
            program: binary.to_path_buf(),
            source,
        })?;

    let outcome = ExecutionOutcome {
        code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    tracing::debug!(
        code = ?outcome.code,
        stdout_len = outcome.stdout.len(),
        stderr_len = outcome.stderr.len(),
        "snippet exited"
    );

    Ok(outcome)
}

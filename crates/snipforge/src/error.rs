//! Error types for the snippet engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine operations.
pub type SnippetResult<T> = Result<T, SnippetError>;

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Toolchain discovery.
    Check,
    /// Compiler or package manager invocation.
    Compile,
    /// Execution of the built snippet.
    Run,
    /// Anything unanticipated (filesystem, spawn, bad template).
    Internal,
}

impl Stage {
    /// Returns the string identifier for this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Check => "check",
            Stage::Compile => "compile",
            Stage::Run => "run",
            Stage::Internal => "internal",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur while assembling, building or running a snippet.
#[derive(Debug, Error)]
pub enum SnippetError {
    /// Compiler or package manager not found.
    #[error("{tool} not found in PATH. {hint}")]
    ToolchainNotFound { tool: String, hint: String },

    /// Fragment/value counts do not zip.
    #[error("Template has {fragments} fragments for {values} values (expected exactly one more fragment than values)")]
    InvalidTemplate { fragments: usize, values: usize },

    /// Build tool exited with non-zero status.
    #[error("Compilation failed with exit code {code}: {stderr}")]
    CompileFailed { code: i32, stderr: String },

    /// Snippet exited with failure or reported an error through the wire protocol.
    #[error("Snippet failed with {}: {}", exit_label(.code), run_detail(.error, .stdout, .stderr))]
    RunFailed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
        /// Decoded error payload, when the snippet emitted one.
        error: Option<serde_json::Value>,
    },

    /// Failed to spawn a toolchain or snippet process.
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a build input into the artifact directory.
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decoded value does not have the requested shape.
    #[error("Snippet value does not match the requested type: {0}")]
    TypeMismatch(#[source] serde_json::Error),

    /// IO error during cache operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn run_detail(error: &Option<serde_json::Value>, stdout: &str, stderr: &str) -> String {
    most_specific(error.as_ref(), stdout, stderr).unwrap_or_else(|| "no output".to_string())
}

fn most_specific(error: Option<&serde_json::Value>, stdout: &str, stderr: &str) -> Option<String> {
    if let Some(value) = error {
        return Some(match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        });
    }
    if !stderr.is_empty() {
        return Some(stderr.to_string());
    }
    if !stdout.is_empty() {
        return Some(stdout.to_string());
    }
    None
}

impl SnippetError {
    /// Creates a toolchain-not-found error.
    pub fn toolchain_not_found(tool: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::ToolchainNotFound {
            tool: tool.into(),
            hint: hint.into(),
        }
    }

    /// Creates a compile failure.
    pub fn compile_failed(code: i32, stderr: impl Into<String>) -> Self {
        Self::CompileFailed {
            code,
            stderr: stderr.into(),
        }
    }

    /// Returns the pipeline stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            SnippetError::ToolchainNotFound { .. } => Stage::Check,
            SnippetError::CompileFailed { .. } => Stage::Compile,
            SnippetError::RunFailed { .. } => Stage::Run,
            SnippetError::InvalidTemplate { .. }
            | SnippetError::SpawnFailed { .. }
            | SnippetError::WriteFailed { .. }
            | SnippetError::TypeMismatch(_)
            | SnippetError::Io(_) => Stage::Internal,
        }
    }

    /// Returns a stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            SnippetError::ToolchainNotFound { .. } => "SNIP_001",
            SnippetError::InvalidTemplate { .. } => "SNIP_002",
            SnippetError::CompileFailed { .. } => "SNIP_003",
            SnippetError::RunFailed { .. } => "SNIP_004",
            SnippetError::SpawnFailed { .. } => "SNIP_005",
            SnippetError::WriteFailed { .. } => "SNIP_006",
            SnippetError::TypeMismatch(_) => "SNIP_007",
            SnippetError::Io(_) => "SNIP_008",
        }
    }

    /// Returns the exit code of the failing process, if any.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            SnippetError::CompileFailed { code, .. } => Some(*code),
            SnippetError::RunFailed { code, .. } => *code,
            _ => None,
        }
    }

    /// Returns the decoded error payload of a run failure.
    pub fn error_value(&self) -> Option<&serde_json::Value> {
        match self {
            SnippetError::RunFailed { error, .. } => error.as_ref(),
            _ => None,
        }
    }

    /// Returns the most specific text describing this failure.
    ///
    /// Preference order is decoded error payload, then stderr, then stdout,
    /// then the error's own message.
    pub fn payload(&self) -> String {
        match self {
            SnippetError::RunFailed {
                error,
                stdout,
                stderr,
                ..
            } => most_specific(error.as_ref(), stdout, stderr).unwrap_or_else(|| self.to_string()),
            SnippetError::CompileFailed { stderr, .. } if !stderr.trim().is_empty() => {
                stderr.clone()
            }
            _ => self.to_string(),
        }
    }
}

//! Run command implementation
//!
//! Builds (or reuses) and runs a snippet file, printing its decoded value.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use snipforge::{BuildMode, Execution, Resolution, RunResult, Stage};
use std::path::Path;
use std::process::ExitCode;

use super::engine_for;
use crate::input;

/// Machine-readable record of one run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Whether the snippet produced a value.
    pub ok: bool,
    /// Build mode used.
    pub mode: BuildMode,
    /// Cache key of the artifact.
    pub key: String,
    /// Whether the build was skipped.
    pub cache_hit: bool,
    /// Decoder terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    /// Decoded value on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Failure details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

/// Failure details within a [`RunReport`].
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    /// Stage that failed.
    pub stage: Stage,
    /// Stable error code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Exit code of the failing process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Decoded error payload from the snippet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl RunReport {
    /// Builds a report from an engine execution.
    pub fn from_execution(execution: &Execution) -> Self {
        let (value, error) = match &execution.result {
            RunResult::Ok(value) => (Some(value.clone()), None),
            RunResult::Err(err) => (
                None,
                Some(ErrorReport {
                    stage: err.stage(),
                    code: err.code(),
                    message: err.to_string(),
                    exit_code: err.exit_code(),
                    payload: err.error_value().cloned(),
                }),
            ),
        };
        Self {
            ok: execution.result.is_ok(),
            mode: execution.mode,
            key: execution.key.to_string(),
            cache_hit: execution.cache_hit,
            resolution: execution.resolution,
            value,
            error,
        }
    }
}

/// Renders a decoded value for terminal output. Strings print unquoted.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Run the run command
///
/// # Arguments
/// * `file` - Path to the snippet file
/// * `lang` - Explicit language (`rust` or `cpp`), inferred from the extension if absent
/// * `values` - Values for the file's `${}` placeholders, in order
/// * `cache_dir` - Cache directory override
/// * `json` - Emit a JSON report instead of human output
///
/// # Returns
/// Exit code: 0 if the snippet produced a value, 1 otherwise
pub fn run(
    file: &str,
    lang: Option<&str>,
    values: &[String],
    cache_dir: Option<&str>,
    json: bool,
) -> Result<ExitCode> {
    let input = input::load(Path::new(file), lang, values)?;
    let engine = engine_for(cache_dir)?;

    let execution = engine.execute(input.language, &input.snippet);
    let report = RunReport::from_execution(&execution);
    tracing::info!(
        file,
        mode = %report.mode,
        cache_hit = report.cache_hit,
        ok = report.ok,
        "Snippet file finished"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_human(&report);
    }

    Ok(if report.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn print_human(report: &RunReport) {
    let cache = if report.cache_hit { "cached" } else { "built" };
    eprintln!(
        "{} {} {} ({})",
        "snippet".cyan().bold(),
        report.mode,
        short_key(&report.key).dimmed(),
        cache
    );

    if let Some(value) = &report.value {
        println!("{}", display_value(value));
    }

    if let Some(error) = &report.error {
        eprintln!(
            "{} [{}] {} stage",
            "FAILED".red().bold(),
            error.code,
            error.stage
        );
        eprintln!("{}", error.message);
    }
}

fn short_key(key: &str) -> &str {
    &key[..key.len().min(12)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use snipforge::{Engine, EngineConfig, Language, Snippet, SnippetError};

    fn execution(result: RunResult) -> Execution {
        let engine = Engine::new(EngineConfig::new("/tmp/snipforge-report"));
        let plan = engine.plan(Language::Cpp, &Snippet::from_source("return 1;"));
        Execution {
            mode: plan.mode,
            key: plan.key,
            artifact_dir: plan.artifact_dir,
            cache_hit: true,
            resolution: Some(Resolution::DecodeOk),
            result,
        }
    }

    #[test]
    fn test_report_success() {
        let report = RunReport::from_execution(&execution(RunResult::Ok(json!(4))));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["ok"], json!(true));
        assert_eq!(value["mode"], json!("cpp"));
        assert_eq!(value["value"], json!(4));
        assert_eq!(value["resolution"], json!("decode_ok"));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_report_failure() {
        let err = SnippetError::RunFailed {
            code: Some(1),
            stdout: String::new(),
            stderr: String::new(),
            error: Some(json!("boom")),
        };
        let report = RunReport::from_execution(&execution(RunResult::Err(err)));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["ok"], json!(false));
        assert_eq!(value["error"]["stage"], json!("run"));
        assert_eq!(value["error"]["code"], json!("SNIP_004"));
        assert_eq!(value["error"]["exit_code"], json!(1));
        assert_eq!(value["error"]["payload"], json!("boom"));
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("plain")), "plain");
        assert_eq!(display_value(&json!(4)), "4");
        assert_eq!(display_value(&json!([1])), "[\n  1\n]");
    }
}

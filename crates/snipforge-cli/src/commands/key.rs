//! Key command implementation
//!
//! Shows how a snippet file would be built without compiling it.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::engine_for;
use crate::input;
use snipforge::{BuildMode, Dependency, Language, Plan};

/// Machine-readable summary of a [`Plan`].
#[derive(Debug, Serialize)]
pub struct KeyReport {
    pub language: Language,
    pub mode: BuildMode,
    pub key: String,
    pub artifact_dir: PathBuf,
    pub cached: bool,
    pub scaffolded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl KeyReport {
    /// Summarizes a plan. `cached` is true once the plan's executable exists.
    ///
    /// Dependencies are listed as they appear in the generated manifest,
    /// implicit ones included.
    pub fn from_plan(plan: &Plan) -> Self {
        let dependencies = plan
            .deps
            .as_ref()
            .map(|deps| deps.resolved().iter().map(Dependency::to_toml_line).collect())
            .unwrap_or_default();
        Self {
            language: plan.language,
            mode: plan.mode,
            key: plan.key.to_string(),
            artifact_dir: plan.artifact_dir.clone(),
            cached: plan.is_built(),
            scaffolded: plan.source.is_scaffolded(),
            dependencies,
        }
    }
}

/// Run the key command
///
/// # Arguments
/// * `file` - Path to the snippet file
/// * `lang` - Explicit language, inferred from the extension if absent
/// * `values` - Values for the file's `${}` placeholders
/// * `cache_dir` - Cache directory override
/// * `json` - Emit JSON instead of human output
pub fn run(
    file: &str,
    lang: Option<&str>,
    values: &[String],
    cache_dir: Option<&str>,
    json: bool,
) -> Result<ExitCode> {
    let input = input::load(Path::new(file), lang, values)?;
    let engine = engine_for(cache_dir)?;
    let report = KeyReport::from_plan(&engine.plan(input.language, &input.snippet));

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", report.key);
    eprintln!("  {}: {}", "Language".dimmed(), report.language);
    eprintln!("  {}: {}", "Mode".dimmed(), report.mode);
    eprintln!(
        "  {}: {}",
        "Entry point".dimmed(),
        if report.scaffolded { "generated" } else { "provided" }
    );
    for dep in &report.dependencies {
        eprintln!("  {}: {}", "Dependency".dimmed(), dep);
    }
    eprintln!(
        "  {}: {} {}",
        "Artifacts".dimmed(),
        report.artifact_dir.display(),
        if report.cached {
            "(cached)".green()
        } else {
            "(not built)".yellow()
        }
    );

    Ok(ExitCode::SUCCESS)
}

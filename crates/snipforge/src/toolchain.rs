//! Compiler and package manager discovery.
//!
//! Lookup order for each build mode:
//!
//! 1. Explicit path from [`EngineConfig`] (including `SNIPFORGE_*` overrides)
//! 2. Candidate names on the search path (`PATH` unless configured)

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::build::BuildMode;
use crate::config::EngineConfig;
use crate::error::{SnippetError, SnippetResult};

/// Executable names tried in order for `mode`.
pub fn candidates(mode: BuildMode) -> &'static [&'static str] {
    match mode {
        BuildMode::Rustc => &["rustc"],
        BuildMode::Cargo => &["cargo"],
        BuildMode::Cpp => &["g++", "clang++"],
    }
}

/// Human-readable name of the tool needed by `mode`.
pub fn tool_label(mode: BuildMode) -> &'static str {
    match mode {
        BuildMode::Rustc => "rustc",
        BuildMode::Cargo => "cargo",
        BuildMode::Cpp => "C++ compiler (g++/clang++)",
    }
}

fn install_hint(mode: BuildMode) -> &'static str {
    match mode {
        BuildMode::Rustc | BuildMode::Cargo => "Please install Rust (https://rustup.rs)",
        BuildMode::Cpp => "Please install g++ or clang++",
    }
}

/// Locates the tool for `mode`, or fails with a check-stage error.
pub fn locate(config: &EngineConfig, mode: BuildMode) -> SnippetResult<PathBuf> {
    if let Some(path) = config.tool_override(mode) {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::debug!(path = %path.display(), "configured tool path does not exist");
    }

    for name in candidates(mode) {
        let found = match &config.search_path {
            Some(paths) => which::which_in(name, Some(paths), &config.project_root),
            None => which::which(name),
        };
        if let Ok(path) = found {
            tracing::debug!(tool = name, path = %path.display(), "found toolchain");
            return Ok(path);
        }
    }

    tracing::warn!(tool = tool_label(mode), "toolchain not found");
    Err(SnippetError::toolchain_not_found(
        tool_label(mode),
        install_hint(mode),
    ))
}

/// Returns the first line of `<tool> --version`, if it runs.
pub fn version(tool: &Path) -> Option<String> {
    let output = Command::new(tool).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|line| line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;

    #[test]
    fn test_missing_tool_is_check_failure() {
        let empty = tempfile::tempdir().unwrap();
        let config = EngineConfig::new(empty.path()).search_path(empty.path());

        let err = locate(&config, BuildMode::Cpp).unwrap_err();
        assert_eq!(err.stage(), Stage::Check);
        assert!(err.to_string().contains("g++/clang++"));

        let err = locate(&config, BuildMode::Cargo).unwrap_err();
        assert!(err.to_string().contains("cargo not found in PATH"));
    }

    #[test]
    fn test_nonexistent_override_falls_through() {
        let empty = tempfile::tempdir().unwrap();
        let config = EngineConfig::new(empty.path())
            .rustc_path(empty.path().join("no-such-rustc"))
            .search_path(empty.path());
        assert!(locate(&config, BuildMode::Rustc).is_err());
    }

    #[test]
    fn test_existing_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("my-rustc");
        std::fs::write(&fake, "").unwrap();
        let config = EngineConfig::new(dir.path())
            .rustc_path(&fake)
            .search_path(dir.path());
        assert_eq!(locate(&config, BuildMode::Rustc).unwrap(), fake);
    }

    #[test]
    fn test_candidate_order() {
        assert_eq!(candidates(BuildMode::Cpp), &["g++", "clang++"]);
        assert_eq!(candidates(BuildMode::Cargo), &["cargo"]);
    }
}

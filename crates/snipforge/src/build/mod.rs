//! Build strategies.
//!
//! Every strategy turns a [`PreparedSource`] into an executable inside an
//! artifact directory named by its [`CacheKey`]. Builds are idempotent: if
//! the executable already exists, nothing is compiled. This is a pure
//! existence check, so a corrupted binary is reused as-is.

mod cargo;
mod direct;

pub use cargo::DependencyResolved;
pub use direct::DirectCompile;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::deps::DependencySpec;
use crate::error::{SnippetError, SnippetResult};
use crate::hash::CacheKey;
use crate::lang::Language;
use crate::prepare::PreparedSource;

/// How a snippet is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    /// Single-file Rust compile with `rustc`.
    Rustc,
    /// Rust project with dependencies, built with `cargo`.
    Cargo,
    /// Single-file C++ compile.
    Cpp,
}

impl BuildMode {
    /// All build modes.
    pub const ALL: [BuildMode; 3] = [BuildMode::Rustc, BuildMode::Cargo, BuildMode::Cpp];

    /// Tag mixed into cache keys.
    pub fn tag(&self) -> &'static str {
        match self {
            BuildMode::Rustc => "rustc",
            BuildMode::Cargo => "cargo",
            BuildMode::Cpp => "cpp",
        }
    }

    /// Directory name under the cache root.
    pub fn cache_dir_name(&self) -> &'static str {
        match self {
            BuildMode::Rustc => "rust",
            BuildMode::Cargo => "rust-cargo",
            BuildMode::Cpp => "cpp",
        }
    }

    /// Language compiled by this mode.
    pub fn language(&self) -> Language {
        match self {
            BuildMode::Rustc | BuildMode::Cargo => Language::Rust,
            BuildMode::Cpp => Language::Cpp,
        }
    }

    /// Whether this mode resolves external dependencies.
    pub fn resolves_dependencies(&self) -> bool {
        matches!(self, BuildMode::Cargo)
    }

    /// Executable path inside an artifact directory built in this mode.
    ///
    /// An artifact is complete only once this file exists; a failed build
    /// leaves the directory behind without it.
    pub fn executable_path(&self, artifact_dir: &Path) -> PathBuf {
        match self {
            BuildMode::Rustc | BuildMode::Cpp => artifact_dir.join(direct::BINARY_NAME),
            BuildMode::Cargo => {
                let name = format!(
                    "{}{}",
                    crate::deps::PACKAGE_NAME,
                    std::env::consts::EXE_SUFFIX
                );
                DependencyResolved::target_dir(artifact_dir)
                    .join("release")
                    .join(name)
            }
        }
    }
}

impl std::fmt::Display for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Inputs to one build.
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    /// Program to compile.
    pub source: &'a PreparedSource,
    /// Declared dependencies (dependency-resolved builds only).
    pub deps: Option<&'a DependencySpec>,
    /// Key naming the artifact directory.
    pub key: &'a CacheKey,
    /// Artifact directory, `<mode dir>/<key>`.
    pub artifact_dir: &'a Path,
}

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// Path to the executable.
    pub executable: PathBuf,
    /// True if the executable already existed and nothing was compiled.
    pub cache_hit: bool,
}

/// A way of turning prepared source into an executable.
pub trait BuildStrategy {
    /// Mode implemented by this strategy.
    fn mode(&self) -> BuildMode;

    /// Deterministic executable path inside an artifact directory.
    fn executable_path(&self, artifact_dir: &Path) -> PathBuf;

    /// Compiles `request.source` unless the executable already exists.
    fn build(&self, request: &BuildRequest<'_>) -> SnippetResult<BuildOutput>;
}

/// Writes a build input, creating parent directories.
pub(crate) fn write_input(path: &Path, contents: &str) -> SnippetResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| SnippetError::WriteFailed {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, contents).map_err(|source| SnippetError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs a compiler or package manager to completion.
///
/// A non-zero exit becomes a compile failure carrying the tool's stderr.
pub(crate) fn run_build_tool(mut cmd: Command, program: &Path) -> SnippetResult<()> {
    let output = cmd.output().map_err(|source| SnippetError::SpawnFailed {
        program: program.to_path_buf(),
        source,
    })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        tracing::warn!(program = %program.display(), code, "build failed");
        return Err(SnippetError::compile_failed(code, stderr));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names() {
        assert_eq!(BuildMode::Rustc.tag(), "rustc");
        assert_eq!(BuildMode::Cargo.cache_dir_name(), "rust-cargo");
        assert_eq!(BuildMode::Cpp.language(), Language::Cpp);
        assert!(BuildMode::Cargo.resolves_dependencies());
        assert!(!BuildMode::Rustc.resolves_dependencies());
    }

    #[test]
    fn test_mode_executable_matches_strategy() {
        let dir = Path::new("/cache/x");
        assert_eq!(
            BuildMode::Cpp.executable_path(dir),
            DirectCompile::new(BuildMode::Cpp, "g++").executable_path(dir)
        );
        assert_eq!(
            BuildMode::Rustc.executable_path(dir),
            PathBuf::from("/cache/x/main_bin")
        );
        assert_eq!(
            BuildMode::Cargo.executable_path(dir),
            DependencyResolved::new("cargo").executable_path(dir)
        );
    }
}

//! Dependency-resolved builds through `cargo`.
//!
//! Each artifact directory is a self-contained cargo project:
//!
//! ```text
//! <key>/
//! ├── Cargo.toml
//! ├── src/main.rs
//! └── target/release/snippet
//! ```
//!
//! The target directory is passed explicitly so snippet builds never share
//! (or collide with) the artifacts of whatever project the host runs in.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{run_build_tool, write_input, BuildMode, BuildOutput, BuildRequest, BuildStrategy};
use crate::deps::{DependencySpec, PACKAGE_NAME};
use crate::error::SnippetResult;

/// Builds a generated cargo project in release mode.
#[derive(Debug, Clone)]
pub struct DependencyResolved {
    cargo: PathBuf,
}

impl DependencyResolved {
    /// Creates a strategy invoking `cargo`.
    pub fn new(cargo: impl Into<PathBuf>) -> Self {
        Self {
            cargo: cargo.into(),
        }
    }

    /// Path of the cargo binary this strategy invokes.
    pub fn cargo(&self) -> &Path {
        &self.cargo
    }

    /// Manifest path inside an artifact directory.
    pub fn manifest_path(artifact_dir: &Path) -> PathBuf {
        artifact_dir.join("Cargo.toml")
    }

    /// Entry point path inside an artifact directory.
    pub fn main_path(artifact_dir: &Path) -> PathBuf {
        artifact_dir.join("src").join("main.rs")
    }

    /// Target directory inside an artifact directory.
    pub fn target_dir(artifact_dir: &Path) -> PathBuf {
        artifact_dir.join("target")
    }
}

impl BuildStrategy for DependencyResolved {
    fn mode(&self) -> BuildMode {
        BuildMode::Cargo
    }

    fn executable_path(&self, artifact_dir: &Path) -> PathBuf {
        BuildMode::Cargo.executable_path(artifact_dir)
    }

    fn build(&self, request: &BuildRequest<'_>) -> SnippetResult<BuildOutput> {
        let bin = self.executable_path(request.artifact_dir);
        if bin.exists() {
            tracing::debug!(key = %request.key, "cache hit");
            return Ok(BuildOutput {
                executable: bin,
                cache_hit: true,
            });
        }

        let manifest = match request.deps {
            Some(deps) => deps.render_manifest(),
            None => DependencySpec::parse("").render_manifest(),
        };
        let manifest_path = Self::manifest_path(request.artifact_dir);
        write_input(&manifest_path, &manifest)?;
        write_input(
            &Self::main_path(request.artifact_dir),
            request.source.as_str(),
        )?;

        tracing::info!(
            key = %request.key,
            cargo = %self.cargo.display(),
            "building snippet project"
        );

        let mut cmd = Command::new(&self.cargo);
        cmd.arg("build")
            .arg("--release")
            .arg("--manifest-path")
            .arg(&manifest_path)
            .arg("--target-dir")
            .arg(Self::target_dir(request.artifact_dir))
            .arg("--quiet")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        run_build_tool(cmd, &self.cargo)?;

        Ok(BuildOutput {
            executable: bin,
            cache_hit: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_layout() {
        let strategy = DependencyResolved::new("cargo");
        let dir = Path::new("/cache/rust-cargo/abc");
        assert_eq!(
            DependencyResolved::manifest_path(dir),
            PathBuf::from("/cache/rust-cargo/abc/Cargo.toml")
        );
        assert_eq!(
            DependencyResolved::main_path(dir),
            PathBuf::from("/cache/rust-cargo/abc/src/main.rs")
        );
        let exe = strategy.executable_path(dir);
        assert!(exe.starts_with("/cache/rust-cargo/abc/target/release"));
        assert_eq!(
            exe.file_stem().and_then(|s| s.to_str()),
            Some(PACKAGE_NAME)
        );
    }
}

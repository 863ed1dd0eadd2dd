//! Single-file compilation straight to a binary.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{run_build_tool, write_input, BuildMode, BuildOutput, BuildRequest, BuildStrategy};
use crate::error::SnippetResult;
use crate::lang::Language;

/// File name of the compiled binary inside the artifact directory.
pub const BINARY_NAME: &str = "main_bin";

/// Compiles `main.<ext>` with `rustc` or a C++ compiler.
#[derive(Debug, Clone)]
pub struct DirectCompile {
    mode: BuildMode,
    compiler: PathBuf,
}

impl DirectCompile {
    /// Creates a direct-compile strategy for `mode` using `compiler`.
    ///
    /// `mode` must not be [`BuildMode::Cargo`]; that mode is handled by
    /// [`DependencyResolved`](super::DependencyResolved).
    pub fn new(mode: BuildMode, compiler: impl Into<PathBuf>) -> Self {
        debug_assert!(mode != BuildMode::Cargo, "cargo builds are dependency-resolved");
        Self {
            mode,
            compiler: compiler.into(),
        }
    }

    /// Path of the compiler this strategy invokes.
    pub fn compiler(&self) -> &Path {
        &self.compiler
    }

    /// Source file path inside an artifact directory.
    pub fn source_path(&self, artifact_dir: &Path) -> PathBuf {
        artifact_dir.join(format!("main.{}", self.mode.language().extension()))
    }

    /// Fixed argument list for compiling `src` into `bin`.
    pub fn compile_args(&self, src: &Path, bin: &Path) -> Vec<OsString> {
        match self.mode.language() {
            Language::Cpp => vec![
                "-std=c++20".into(),
                "-O2".into(),
                src.into(),
                "-o".into(),
                bin.into(),
            ],
            Language::Rust => vec![
                src.into(),
                "-o".into(),
                bin.into(),
                "--edition".into(),
                "2021".into(),
            ],
        }
    }
}

impl BuildStrategy for DirectCompile {
    fn mode(&self) -> BuildMode {
        self.mode
    }

    fn executable_path(&self, artifact_dir: &Path) -> PathBuf {
        self.mode.executable_path(artifact_dir)
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

        let src = self.source_path(request.artifact_dir);
        write_input(&src, request.source.as_str())?;

        tracing::info!(
            mode = %self.mode,
            key = %request.key,
            compiler = %self.compiler.display(),
            "compiling snippet"
        );

        let mut cmd = Command::new(&self.compiler);
        cmd.args(self.compile_args(&src, &bin))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        run_build_tool(cmd, &self.compiler)?;

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
    fn test_cpp_args() {
        let strategy = DirectCompile::new(BuildMode::Cpp, "/usr/bin/g++");
        let args = strategy.compile_args(Path::new("/c/main.cpp"), Path::new("/c/main_bin"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec!["-std=c++20", "-O2", "/c/main.cpp", "-o", "/c/main_bin"]
        );
    }

    #[test]
    fn test_rustc_args_and_paths() {
        let strategy = DirectCompile::new(BuildMode::Rustc, "rustc");
        let dir = Path::new("/cache/rust/abc");
        assert_eq!(strategy.source_path(dir), PathBuf::from("/cache/rust/abc/main.rs"));
        assert_eq!(
            strategy.executable_path(dir),
            PathBuf::from("/cache/rust/abc/main_bin")
        );
        let args = strategy.compile_args(&strategy.source_path(dir), &strategy.executable_path(dir));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "/cache/rust/abc/main.rs",
                "-o",
                "/cache/rust/abc/main_bin",
                "--edition",
                "2021"
            ]
        );
    }
}

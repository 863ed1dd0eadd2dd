//! Engine configuration.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::build::BuildMode;

/// Name of the cache directory created under the project root.
pub const CACHE_DIR_NAME: &str = ".cache";

/// Environment variable overriding the whole cache directory.
pub const CACHE_DIR_ENV: &str = "SNIPFORGE_CACHE_DIR";

/// Environment variable pointing at a `rustc` binary.
pub const RUSTC_ENV: &str = "SNIPFORGE_RUSTC";

/// Environment variable pointing at a `cargo` binary.
pub const CARGO_ENV: &str = "SNIPFORGE_CARGO";

/// Environment variable pointing at a C++ compiler.
pub const CXX_ENV: &str = "SNIPFORGE_CXX";

/// Configuration for the snippet [`Engine`](crate::Engine).
///
/// All filesystem state the engine touches lives under [`cache_root`](Self::cache_root).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Project root; the cache defaults to `<project_root>/.cache`.
    pub project_root: PathBuf,
    /// Explicit cache directory, replacing `<project_root>/.cache`.
    pub cache_dir: Option<PathBuf>,
    /// Explicit `rustc` path.
    pub rustc_path: Option<PathBuf>,
    /// Explicit `cargo` path.
    pub cargo_path: Option<PathBuf>,
    /// Explicit C++ compiler path.
    pub cxx_path: Option<PathBuf>,
    /// Search path used instead of `PATH` for toolchain discovery.
    pub search_path: Option<OsString>,
}

impl EngineConfig {
    /// Creates a config rooted at `project_root`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            cache_dir: None,
            rustc_path: None,
            cargo_path: None,
            cxx_path: None,
            search_path: None,
        }
    }

    /// Creates a config rooted at `project_root`, applying `SNIPFORGE_*` overrides.
    pub fn from_env(project_root: impl Into<PathBuf>) -> Self {
        let env_path = |name: &str| std::env::var_os(name).map(PathBuf::from);
        Self {
            cache_dir: env_path(CACHE_DIR_ENV),
            rustc_path: env_path(RUSTC_ENV),
            cargo_path: env_path(CARGO_ENV),
            cxx_path: env_path(CXX_ENV),
            ..Self::new(project_root)
        }
    }

    /// Sets the cache directory.
    pub fn cache_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(path.into());
        self
    }

    /// Sets the `rustc` path.
    pub fn rustc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rustc_path = Some(path.into());
        self
    }

    /// Sets the `cargo` path.
    pub fn cargo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cargo_path = Some(path.into());
        self
    }

    /// Sets the C++ compiler path.
    pub fn cxx_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cxx_path = Some(path.into());
        self
    }

    /// Sets the search path for toolchain discovery.
    pub fn search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    /// Root of all cached artifacts.
    pub fn cache_root(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => self.project_root.join(CACHE_DIR_NAME),
        }
    }

    /// Directory holding artifacts for one build mode.
    pub fn mode_dir(&self, mode: BuildMode) -> PathBuf {
        self.cache_root().join(mode.cache_dir_name())
    }

    /// Explicit tool path configured for `mode`, if any.
    pub fn tool_override(&self, mode: BuildMode) -> Option<&Path> {
        match mode {
            BuildMode::Rustc => self.rustc_path.as_deref(),
            BuildMode::Cargo => self.cargo_path.as_deref(),
            BuildMode::Cpp => self.cxx_path.as_deref(),
        }
    }
}

//! The snippet execution pipeline.
//!
//! ```text
//! Snippet ─▶ assemble ─▶ prepare ─▶ cache key ─▶ build (skipped on hit) ─▶ run ─▶ decode
//! ```
//!
//! Each call runs the pipeline synchronously on the caller's thread. Callers
//! racing on the same cold cache key are not coordinated: both may compile
//! into the same artifact directory, and one may observe the other's
//! partially written files.

use std::path::PathBuf;

use crate::build::{BuildMode, BuildRequest, BuildStrategy, DependencyResolved, DirectCompile};
use crate::config::EngineConfig;
use crate::deps::DependencySpec;
use crate::error::SnippetResult;
use crate::hash::CacheKey;
use crate::lang::Language;
use crate::prepare::{prepare, PreparedSource};
use crate::protocol::{self, Decoded, Resolution};
use crate::result::RunResult;
use crate::runner;
use crate::snippet::Snippet;
use crate::toolchain;

/// Everything decided about a snippet before any process is spawned.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Language the snippet is written in.
    pub language: Language,
    /// Selected build mode.
    pub mode: BuildMode,
    /// Snippet text after interpolation.
    pub assembled: String,
    /// Dependency directive, for dependency-resolved builds.
    pub deps: Option<DependencySpec>,
    /// Complete program to compile.
    pub source: PreparedSource,
    /// Cache key naming the artifact directory.
    pub key: CacheKey,
    /// Artifact directory for this key.
    pub artifact_dir: PathBuf,
    /// Executable the build produces inside `artifact_dir`.
    pub executable: PathBuf,
}

impl Plan {
    /// Returns true if the executable for this plan already exists.
    ///
    /// A directory left behind by a failed build does not count.
    pub fn is_built(&self) -> bool {
        self.executable.is_file()
    }
}

/// Record of one pipeline run.
#[derive(Debug)]
pub struct Execution {
    /// Build mode used.
    pub mode: BuildMode,
    /// Cache key of the artifact.
    pub key: CacheKey,
    /// Artifact directory.
    pub artifact_dir: PathBuf,
    /// True if the executable was reused without compiling.
    pub cache_hit: bool,
    /// Decoder terminal state, if the snippet ran.
    pub resolution: Option<Resolution>,
    /// Decoded value or error.
    pub result: RunResult,
}

/// Compiles, caches and runs snippets.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Selects the build mode for an assembled snippet.
    ///
    /// Rust snippets with a `// cargo-deps:` directive are built with cargo.
    pub fn select_mode(language: Language, assembled: &str) -> (BuildMode, Option<DependencySpec>) {
        match language {
            Language::Cpp => (BuildMode::Cpp, None),
            Language::Rust => match DependencySpec::from_source(assembled) {
                Some(deps) => (BuildMode::Cargo, Some(deps)),
                None => (BuildMode::Rustc, None),
            },
        }
    }

    /// Assembles and prepares a snippet and computes its cache key.
    ///
    /// Touches neither the filesystem nor the toolchain.
    pub fn plan(&self, language: Language, snippet: &Snippet) -> Plan {
        let assembled = snippet.assemble(language);
        let (mode, deps) = Self::select_mode(language, &assembled);
        let source = prepare(mode, &assembled);
        let key = CacheKey::compute(mode, deps.as_ref().map(DependencySpec::directive), &source);
        let artifact_dir = self.config.mode_dir(mode).join(key.as_str());
        let executable = mode.executable_path(&artifact_dir);

        tracing::debug!(
            language = %language,
            mode = %mode,
            assembled_len = assembled.len(),
            scaffolded = source.is_scaffolded(),
            key = %key,
            "planned snippet"
        );

        Plan {
            language,
            mode,
            assembled,
            deps,
            source,
            key,
            artifact_dir,
            executable,
        }
    }

    /// Runs the full pipeline and reports what happened.
    pub fn execute(&self, language: Language, snippet: &Snippet) -> Execution {
        let plan = self.plan(language, snippet);
        let mut cache_hit = false;

        let (resolution, result) = match self.drive(&plan, &mut cache_hit) {
            Ok(decoded) => (Some(decoded.resolution), decoded.result),
            Err(err) => {
                tracing::debug!(stage = %err.stage(), code = err.code(), "pipeline failed");
                (None, RunResult::Err(err))
            }
        };

        Execution {
            mode: plan.mode,
            key: plan.key,
            artifact_dir: plan.artifact_dir,
            cache_hit,
            resolution,
            result,
        }
    }

    /// Runs the full pipeline and returns only the result.
    pub fn run(&self, language: Language, snippet: &Snippet) -> RunResult {
        self.execute(language, snippet).result
    }

    /// Runs a Rust snippet.
    pub fn rust(&self, snippet: &Snippet) -> RunResult {
        self.run(Language::Rust, snippet)
    }

    /// Runs a C++ snippet.
    pub fn cpp(&self, snippet: &Snippet) -> RunResult {
        self.run(Language::Cpp, snippet)
    }

    /// Locates the toolchain for `mode` and returns the matching strategy.
    pub fn strategy(&self, mode: BuildMode) -> SnippetResult<Box<dyn BuildStrategy>> {
        let tool = toolchain::locate(&self.config, mode)?;
        Ok(match mode {
            BuildMode::Cargo => Box::new(DependencyResolved::new(tool)),
            BuildMode::Rustc | BuildMode::Cpp => Box::new(DirectCompile::new(mode, tool)),
        })
    }

    fn drive(&self, plan: &Plan, cache_hit: &mut bool) -> SnippetResult<Decoded> {
        let strategy = self.strategy(plan.mode)?;

        std::fs::create_dir_all(&plan.artifact_dir)?;
        let output = strategy.build(&BuildRequest {
            source: &plan.source,
            deps: plan.deps.as_ref(),
            key: &plan.key,
            artifact_dir: &plan.artifact_dir,
        })?;
        *cache_hit = output.cache_hit;

        let outcome = runner::run_executable(&output.executable)?;
        let decoded = protocol::decode(&outcome);
        tracing::debug!(resolution = decoded.resolution.as_str(), "decoded snippet output");
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;

    #[test]
    fn test_mode_selection() {
        assert_eq!(
            Engine::select_mode(Language::Rust, "Ok::<i32, String>(1)").0,
            BuildMode::Rustc
        );
        let (mode, deps) = Engine::select_mode(Language::Rust, "// cargo-deps: rand\nOk(1)");
        assert_eq!(mode, BuildMode::Cargo);
        assert_eq!(deps.unwrap().directive(), "rand");
        assert_eq!(
            Engine::select_mode(Language::Cpp, "// cargo-deps: rand").0,
            BuildMode::Cpp
        );
    }

    #[test]
    fn test_plan_is_pure_and_deterministic() {
        let root = tempfile::tempdir().unwrap();
        let engine = Engine::new(EngineConfig::new(root.path()));
        let snippet = Snippet::from_source("return 2 + 2;");

        let a = engine.plan(Language::Cpp, &snippet);
        let b = engine.plan(Language::Cpp, &snippet);
        assert_eq!(a.key, b.key);
        assert_eq!(
            a.artifact_dir,
            root.path().join(".cache").join("cpp").join(a.key.as_str())
        );
        assert_eq!(a.executable, a.artifact_dir.join("main_bin"));
        assert!(!a.is_built());
        assert!(!root.path().join(".cache").exists());
    }

    #[test]
    fn test_interpolated_values_change_key() {
        let root = tempfile::tempdir().unwrap();
        let engine = Engine::new(EngineConfig::new(root.path()));
        let one = Snippet::parse_template("return ${};", vec![1.into()]).unwrap();
        let two = Snippet::parse_template("return ${};", vec![2.into()]).unwrap();
        assert_ne!(
            engine.plan(Language::Cpp, &one).key,
            engine.plan(Language::Cpp, &two).key
        );
    }

    #[test]
    fn test_missing_toolchain_reports_check_stage() {
        let root = tempfile::tempdir().unwrap();
        let engine = Engine::new(EngineConfig::new(root.path()).search_path(root.path()));

        let execution = engine.execute(Language::Rust, &Snippet::from_source("Ok::<i32, String>(4)"));
        let err = execution.result.error().unwrap();
        assert_eq!(err.stage(), Stage::Check);
        assert!(err.to_string().contains("rustc"));
        assert!(execution.resolution.is_none());
        assert!(!execution.cache_hit);
        assert!(!execution.artifact_dir.exists());
    }
}

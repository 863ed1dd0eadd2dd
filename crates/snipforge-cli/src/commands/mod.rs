//! CLI command implementations

pub mod cache;
pub mod doctor;
pub mod key;
pub mod run;

use anyhow::{Context, Result};
use snipforge::{Engine, EngineConfig};

/// Resolves the engine configuration for a command.
///
/// The project root is the current directory; `SNIPFORGE_*` variables apply,
/// and an explicit `--cache-dir` wins over both.
pub fn config_for(cache_dir: Option<&str>) -> Result<EngineConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let config = EngineConfig::from_env(cwd);
    let config = match cache_dir {
        Some(dir) => config.cache_dir(dir),
        None => config,
    };
    tracing::debug!(
        project_root = %config.project_root.display(),
        cache_root = %config.cache_root().display(),
        cache_dir_flag = cache_dir.is_some(),
        "Resolved engine config"
    );
    Ok(config)
}

fn engine_for(cache_dir: Option<&str>) -> Result<Engine> {
    Ok(Engine::new(config_for(cache_dir)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cache_dir_flag_wins() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path().to_str()).unwrap();
        assert_eq!(config.cache_root(), dir.path());
        assert_eq!(config.project_root, std::env::current_dir().unwrap());
    }
}

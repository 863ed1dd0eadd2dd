//! Cache management commands
//!
//! Read-only: artifacts are never evicted.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::config_for;
use snipforge::{BuildMode, EngineConfig};

/// Usage of one mode directory.
///
/// Only directories holding a finished executable are entries; directories
/// left behind by failed builds are counted as incomplete. Both contribute
/// to the size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeUsage {
    pub mode: BuildMode,
    pub dir: PathBuf,
    pub entry_count: u64,
    pub incomplete_count: u64,
    pub total_size_bytes: u64,
}

/// Cache information
#[derive(Debug, Clone, Serialize)]
pub struct CacheInfo {
    /// Cache root
    pub cache_dir: PathBuf,
    /// One row per build mode
    pub modes: Vec<ModeUsage>,
}

impl CacheInfo {
    /// Collects per-mode entry counts and sizes.
    pub fn collect(config: &EngineConfig) -> Result<Self> {
        let modes = BuildMode::ALL
            .iter()
            .map(|&mode| {
                let dir = config.mode_dir(mode);
                mode_usage(mode, dir)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            cache_dir: config.cache_root(),
            modes,
        })
    }

    pub fn entry_count(&self) -> u64 {
        self.modes.iter().map(|m| m.entry_count).sum()
    }

    pub fn incomplete_count(&self) -> u64 {
        self.modes.iter().map(|m| m.incomplete_count).sum()
    }

    pub fn total_size_bytes(&self) -> u64 {
        self.modes.iter().map(|m| m.total_size_bytes).sum()
    }
}

fn mode_usage(mode: BuildMode, dir: PathBuf) -> Result<ModeUsage> {
    let mut usage = ModeUsage {
        mode,
        dir,
        entry_count: 0,
        incomplete_count: 0,
        total_size_bytes: 0,
    };
    if !usage.dir.is_dir() {
        return Ok(usage);
    }

    for entry in std::fs::read_dir(&usage.dir).context("Failed to read cache directory")? {
        let path = entry.context("Failed to read directory entry")?.path();
        if !path.is_dir() {
            continue;
        }
        if mode.executable_path(&path).is_file() {
            usage.entry_count += 1;
        } else {
            usage.incomplete_count += 1;
        }
        usage.total_size_bytes += dir_size(&path)?;
    }
    Ok(usage)
}

fn dir_size(path: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in walkdir::WalkDir::new(path) {
        let entry = entry.context("Failed to walk directory")?;
        if entry.file_type().is_file() {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

fn format_size(bytes: u64) -> String {
    let size_mb = bytes as f64 / (1024.0 * 1024.0);
    if size_mb >= 1.0 {
        format!("{:.2} MB", size_mb)
    } else {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    }
}

/// Show cache information
pub fn info(cache_dir: Option<&str>, json: bool) -> Result<ExitCode> {
    let info = CacheInfo::collect(&config_for(cache_dir)?)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", "Cache Information".cyan().bold());
    println!(
        "  {}: {}",
        "Cache directory".dimmed(),
        info.cache_dir.display()
    );
    for usage in &info.modes {
        println!(
            "  {:<6} {:>4} {}  {}",
            usage.mode.tag(),
            usage.entry_count,
            if usage.entry_count == 1 { "entry  " } else { "entries" },
            format_size(usage.total_size_bytes)
        );
        if usage.incomplete_count > 0 {
            println!(
                "  {:<6} {:>4} {}",
                "",
                usage.incomplete_count,
                "incomplete (failed build)".yellow()
            );
        }
    }
    println!(
        "  {}: {} ({})",
        "Total".dimmed(),
        info.entry_count(),
        format_size(info.total_size_bytes())
    );

    Ok(ExitCode::SUCCESS)
}

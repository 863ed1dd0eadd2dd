//! Doctor command implementation
//!
//! Checks toolchain discovery and cache directory permissions.

use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;

use super::config_for;
use snipforge::{toolchain, BuildMode, EngineConfig};

/// Outcome of looking up one build mode's tool.
#[derive(Debug)]
pub enum ToolStatus {
    /// Found at a path, with its `--version` line if it ran.
    Found {
        path: std::path::PathBuf,
        version: Option<String>,
    },
    /// Not found; carries the install hint.
    Missing(String),
}

/// Looks up the tool for `mode` the same way the engine does.
pub fn check_tool(config: &EngineConfig, mode: BuildMode) -> ToolStatus {
    match toolchain::locate(config, mode) {
        Ok(path) => {
            let version = toolchain::version(&path);
            ToolStatus::Found { path, version }
        }
        Err(err) => ToolStatus::Missing(err.to_string()),
    }
}

/// Run the doctor command
///
/// Checks:
/// - rustc, cargo and C++ compiler discovery
/// - Cache directory permissions
///
/// # Returns
/// Exit code: 0 if at least one build mode is usable and the cache is
/// writable, 1 otherwise
pub fn run(cache_dir: Option<&str>) -> Result<ExitCode> {
    let config = config_for(cache_dir)?;

    println!("{}", "Snipforge Doctor".cyan().bold());
    println!("{}", "================".cyan());
    println!();

    println!("{}", "Versions:".bold());
    println!(
        "  {} snipforge-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("{}", "Toolchains:".bold());
    let mut usable = 0;
    for mode in BuildMode::ALL {
        match check_tool(&config, mode) {
            ToolStatus::Found { path, version } => {
                usable += 1;
                println!(
                    "  {} {:<6} {} ({})",
                    "ok".green(),
                    mode.tag(),
                    version.as_deref().unwrap_or("unknown version"),
                    path.display()
                );
            }
            ToolStatus::Missing(message) => {
                println!("  {} {:<6} {}", "!!".yellow(), mode.tag(), message.dimmed());
            }
        }
    }
    println!();

    println!("{}", "Cache:".bold());
    let cache_root = config.cache_root();
    let writable = match check_writable(&cache_root) {
        Ok(()) => {
            println!(
                "  {} Cache directory is writable ({})",
                "ok".green(),
                cache_root.display()
            );
            true
        }
        Err(e) => {
            println!(
                "  {} Cannot write to {}: {}",
                "!!".red(),
                cache_root.display(),
                e
            );
            false
        }
    };
    println!();

    if usable > 0 && writable {
        println!("{}", "All checks passed.".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", "Some checks failed.".red().bold());
        Ok(ExitCode::from(1))
    }
}

fn check_writable(dir: &std::path::Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let probe = dir.join(".snipforge_write_test");
    std::fs::write(&probe, "test")?;
    let _ = std::fs::remove_file(&probe);
    Ok(())
}

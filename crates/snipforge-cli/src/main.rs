//! Snipforge CLI - Compile, cache and run Rust and C++ snippets
//!
//! This binary runs snippet files through the snipforge engine and inspects
//! the artifact cache.

use clap::{ArgAction, Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use snipforge_cli::commands;

/// Snipforge - Cached snippet execution for Rust and C++
#[derive(Parser)]
#[command(name = "snipforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build (or reuse) and run a snippet file, printing its value
    Run {
        /// Path to the snippet file (.rs, .cpp, .cc, .cxx)
        file: String,

        /// Snippet language (default: inferred from the file extension)
        #[arg(short, long, value_parser = ["rust", "cpp"])]
        lang: Option<String>,

        /// Value for the next `${}` placeholder (JSON, or raw text)
        #[arg(long = "value")]
        values: Vec<String>,

        /// Cache directory (default: ./.cache)
        #[arg(long)]
        cache_dir: Option<String>,

        /// Output a machine-readable JSON report (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Print the cache key and build plan of a snippet file without building
    Key {
        /// Path to the snippet file
        file: String,

        /// Snippet language (default: inferred from the file extension)
        #[arg(short, long, value_parser = ["rust", "cpp"])]
        lang: Option<String>,

        /// Value for the next `${}` placeholder (JSON, or raw text)
        #[arg(long = "value")]
        values: Vec<String>,

        /// Cache directory (default: ./.cache)
        #[arg(long)]
        cache_dir: Option<String>,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Check toolchains and cache permissions
    Doctor {
        /// Cache directory (default: ./.cache)
        #[arg(long)]
        cache_dir: Option<String>,
    },

    /// Inspect the artifact cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show per-mode entry counts and sizes
    Info {
        /// Cache directory (default: ./.cache)
        #[arg(long)]
        cache_dir: Option<String>,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn init_tracing(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose))),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            file,
            lang,
            values,
            cache_dir,
            json,
        } => commands::run::run(
            &file,
            lang.as_deref(),
            &values,
            cache_dir.as_deref(),
            json,
        ),
        Commands::Key {
            file,
            lang,
            values,
            cache_dir,
            json,
        } => commands::key::run(
            &file,
            lang.as_deref(),
            &values,
            cache_dir.as_deref(),
            json,
        ),
        Commands::Doctor { cache_dir } => commands::doctor::run(cache_dir.as_deref()),
        Commands::Cache { action } => match action {
            CacheAction::Info { cache_dir, json } => {
                commands::cache::info(cache_dir.as_deref(), json)
            }
        },
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_with_values() {
        let cli = Cli::try_parse_from([
            "snipforge",
            "run",
            "find.cpp",
            "--value",
            "[3,1,5]",
            "--value",
            "5",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                file,
                lang,
                values,
                cache_dir,
                json,
            } => {
                assert_eq!(file, "find.cpp");
                assert!(lang.is_none());
                assert_eq!(values, vec!["[3,1,5]".to_string(), "5".to_string()]);
                assert!(cache_dir.is_none());
                assert!(json);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_language() {
        assert!(Cli::try_parse_from(["snipforge", "run", "a.txt", "--lang", "go"]).is_err());
        assert!(Cli::try_parse_from(["snipforge", "run", "a.txt", "--lang", "cpp"]).is_ok());
    }

    #[test]
    fn test_cli_run_requires_file() {
        assert!(Cli::try_parse_from(["snipforge", "run"]).is_err());
    }

    #[test]
    fn test_cli_parses_key() {
        let cli = Cli::try_parse_from([
            "snipforge",
            "key",
            "a.rs",
            "--cache-dir",
            "/tmp/cache",
        ])
        .unwrap();
        match cli.command {
            Commands::Key {
                file, cache_dir, ..
            } => {
                assert_eq!(file, "a.rs");
                assert_eq!(cache_dir.as_deref(), Some("/tmp/cache"));
            }
            _ => panic!("expected key command"),
        }
    }

    #[test]
    fn test_cli_parses_cache_info() {
        let cli = Cli::try_parse_from(["snipforge", "cache", "info", "--json"]).unwrap();
        match cli.command {
            Commands::Cache {
                action: CacheAction::Info { json, cache_dir },
            } => {
                assert!(json);
                assert!(cache_dir.is_none());
            }
            _ => panic!("expected cache info command"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["snipforge", "doctor", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(default_filter(cli.verbose), "debug");
        assert_eq!(default_filter(0), "warn");
    }
}

//! Target languages and their surface syntax.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

/// Regex for a Rust entry point.
const RUST_MAIN_PATTERN: &str = r"\bfn\s+main\s*\(";

/// Regex for a C++ entry point.
const CPP_MAIN_PATTERN: &str = r"\bint\s+main\s*\(";

static RUST_MAIN_REGEX: OnceLock<Regex> = OnceLock::new();
static CPP_MAIN_REGEX: OnceLock<Regex> = OnceLock::new();

/// A foreign language a snippet can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Rust, built with `rustc` or `cargo`.
    Rust,
    /// C++, built with `g++` or `clang++`.
    Cpp,
}

impl Language {
    /// Returns the string identifier for this language.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Cpp => "cpp",
        }
    }

    /// Source file extension used inside artifact directories.
    pub fn extension(&self) -> &'static str {
        match self {
            Language::Rust => "rs",
            Language::Cpp => "cpp",
        }
    }

    /// Infers the language from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "rs" => Some(Language::Rust),
            "cpp" | "cc" | "cxx" | "c++" => Some(Language::Cpp),
            _ => None,
        }
    }

    /// Returns true if `source` declares its own entry point.
    pub fn has_entry_point(&self, source: &str) -> bool {
        let regex = match self {
            Language::Rust => RUST_MAIN_REGEX
                .get_or_init(|| Regex::new(RUST_MAIN_PATTERN).expect("invalid regex pattern")),
            Language::Cpp => CPP_MAIN_REGEX
                .get_or_init(|| Regex::new(CPP_MAIN_PATTERN).expect("invalid regex pattern")),
        };
        regex.is_match(source)
    }

    /// Renders already-stringified items as an aggregate literal.
    ///
    /// C++ uses brace initializer lists, Rust uses array literals.
    pub fn aggregate_literal(&self, items: &[String]) -> String {
        match self {
            Language::Cpp => format!("{{ {} }}", items.join(", ")),
            Language::Rust => format!("[{}]", items.join(", ")),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rust" | "rs" => Ok(Language::Rust),
            "cpp" | "c++" | "cxx" => Ok(Language::Cpp),
            other => Err(format!("unknown language '{}' (expected rust or cpp)", other)),
        }
    }
}

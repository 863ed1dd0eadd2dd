//! `// cargo-deps:` directive parsing and manifest rendering.
//!
//! A Rust snippet opts into dependency-resolved builds with one comment line:
//!
//! ```text
//! // cargo-deps: walkdir = "2", rand, tokio = { version = "1", features = ["rt", "macros"] }
//! ```
//!
//! Entries are separated by top-level commas; commas nested inside braces,
//! brackets, parentheses or quoted strings belong to the entry.

use regex::Regex;
use std::sync::OnceLock;

/// Regex for the dependency directive. The keyword is case-insensitive.
const DIRECTIVE_PATTERN: &str = r"(?i)//\s*cargo-deps\s*:\s*(.*)";

static DIRECTIVE_REGEX: OnceLock<Regex> = OnceLock::new();

fn directive_regex() -> &'static Regex {
    DIRECTIVE_REGEX.get_or_init(|| Regex::new(DIRECTIVE_PATTERN).expect("invalid regex pattern"))
}

/// Package name written into generated manifests; also the binary name.
pub const PACKAGE_NAME: &str = "snippet";

/// Dependencies injected so the generated entry point can serialize results.
pub const IMPLICIT_DEPENDENCIES: &[(&str, &str)] = &[
    ("serde", r#"serde = { version = "1", features = ["derive"] }"#),
    ("serde_json", r#"serde_json = "1""#),
];

/// One declared dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Crate name (text before the first `=`).
    pub name: String,
    /// The entry exactly as declared, trimmed.
    pub raw: String,
}

impl Dependency {
    /// Parses a single entry (`name` or `name = value`).
    pub fn parse(entry: &str) -> Self {
        let raw = entry.trim().to_string();
        let name = match raw.find('=') {
            Some(eq) => raw[..eq].trim().to_string(),
            None => raw.clone(),
        };
        Self { name, raw }
    }

    /// Renders this entry as a `[dependencies]` line.
    ///
    /// Entries containing a table or array are passed through untouched.
    /// A bare name, or a name with an empty value, means any version.
    pub fn to_toml_line(&self) -> String {
        if self.raw.contains(|c: char| c == '{' || c == '[') {
            return self.raw.clone();
        }
        match self.raw.find('=') {
            None => format!("{} = \"*\"", self.raw),
            Some(eq) => {
                let value = self.raw[eq + 1..].trim();
                let value = if value.is_empty() { "\"*\"" } else { value };
                format!("{} = {}", self.name, value)
            }
        }
    }
}

/// Ordered dependency declarations from a directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    directive: String,
    entries: Vec<Dependency>,
}

impl DependencySpec {
    /// Finds and parses the directive in `source`.
    ///
    /// Returns `None` if the snippet has no directive. An empty directive
    /// still selects dependency-resolved mode.
    pub fn from_source(source: &str) -> Option<Self> {
        let captures = directive_regex().captures(source)?;
        let directive = captures
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        Some(Self::parse(&directive))
    }

    /// Parses a comma-separated dependency list.
    pub fn parse(directive: &str) -> Self {
        let entries = split_top_level(directive)
            .iter()
            .map(|entry| Dependency::parse(entry))
            .collect();
        Self {
            directive: directive.to_string(),
            entries,
        }
    }

    /// The directive text after the colon, as written. Used in cache keys.
    pub fn directive(&self) -> &str {
        &self.directive
    }

    /// Declared entries in order.
    pub fn entries(&self) -> &[Dependency] {
        &self.entries
    }

    /// Returns true if a dependency named `name` is declared.
    pub fn declares(&self, name: &str) -> bool {
        self.entries.iter().any(|d| d.name == name)
    }

    /// Declared entries followed by any missing implicit dependencies.
    pub fn resolved(&self) -> Vec<Dependency> {
        let mut deps = self.entries.clone();
        for (name, line) in IMPLICIT_DEPENDENCIES {
            if !self.declares(name) {
                deps.push(Dependency::parse(line));
            }
        }
        deps
    }

    /// Renders the `Cargo.toml` for a snippet project.
    pub fn render_manifest(&self) -> String {
        let deps: Vec<String> = self.resolved().iter().map(Dependency::to_toml_line).collect();
        format!(
            "[package]\nname = \"{}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n\n[dependencies]\n{}\n",
            PACKAGE_NAME,
            deps.join("\n")
        )
    }
}

/// Splits on commas that are not nested in `{}`, `[]`, `()` or a string.
///
/// Strings may be single- or double-quoted and honour backslash escapes.
/// Unbalanced closing delimiters are ignored. Empty entries are dropped.
pub fn split_top_level(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut curly = 0usize;
    let mut square = 0usize;
    let mut paren = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for ch in input.chars() {
        if escaped {
            escaped = false;
            current.push(ch);
            continue;
        }
        if let Some(quote) = in_string {
            if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                in_string = None;
            }
            current.push(ch);
            continue;
        }
        match ch {
            '"' | '\'' => in_string = Some(ch),
            '{' => curly += 1,
            '}' => curly = curly.saturating_sub(1),
            '[' => square += 1,
            ']' => square = square.saturating_sub(1),
            '(' => paren += 1,
            ')' => paren = paren.saturating_sub(1),
            ',' if curly == 0 && square == 0 && paren == 0 => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

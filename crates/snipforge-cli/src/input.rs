//! Loading snippet templates from files.
//!
//! A snippet file is plain Rust or C++ source. Every `${}` in it is a hole
//! filled positionally from `--value` arguments; write `$${}` where the
//! source needs a literal `${}`. Values that parse as JSON
//! are interpolated structurally (so `[3,1,5]` becomes an aggregate literal);
//! anything else is inserted as raw text.

use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use snipforge::{Language, Snippet};
use std::path::{Path, PathBuf};

/// A snippet loaded from disk.
#[derive(Debug, Clone)]
pub struct SnippetInput {
    /// Path the template was read from.
    pub path: PathBuf,
    /// Resolved language.
    pub language: Language,
    /// Parsed template.
    pub snippet: Snippet,
}

/// Parses a `--value` argument.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Resolves the language from an explicit flag or the file extension.
pub fn resolve_language(path: &Path, lang: Option<&str>) -> Result<Language> {
    if let Some(lang) = lang {
        return lang.parse::<Language>().map_err(|e| anyhow!(e));
    }
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    Language::from_extension(ext).ok_or_else(|| {
        anyhow!(
            "Cannot infer language from '{}'; pass --lang rust or --lang cpp",
            path.display()
        )
    })
}

/// Loads a snippet template and fills its holes.
pub fn load(path: &Path, lang: Option<&str>, values: &[String]) -> Result<SnippetInput> {
    let language = resolve_language(path, lang)?;
    let template = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snippet file: {}", path.display()))?;

    let holes = snipforge::snippet::split_template(&template).len() - 1;
    if holes != values.len() {
        bail!(
            "{} has {} placeholder(s) but {} --value argument(s) were given",
            path.display(),
            holes,
            values.len()
        );
    }

    let values = values.iter().map(|v| parse_value(v)).collect();
    let snippet = Snippet::parse_template(&template, values)
        .with_context(|| format!("Invalid snippet template: {}", path.display()))?;

    Ok(SnippetInput {
        path: path.to_path_buf(),
        language,
        snippet,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("[3,1,5]"), json!([3, 1, 5]));
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("./src"), json!("./src"));
        assert_eq!(parse_value("\"quoted\""), json!("quoted"));
    }

    #[test]
    fn test_resolve_language() {
        assert_eq!(
            resolve_language(Path::new("a.rs"), None).unwrap(),
            Language::Rust
        );
        assert_eq!(
            resolve_language(Path::new("a.cc"), None).unwrap(),
            Language::Cpp
        );
        assert_eq!(
            resolve_language(Path::new("a.txt"), Some("cpp")).unwrap(),
            Language::Cpp
        );
        assert!(resolve_language(Path::new("a.txt"), None).is_err());
        assert!(resolve_language(Path::new("a.rs"), Some("cobol")).is_err());
    }

    #[test]
    fn test_load_fills_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("find.cpp");
        std::fs::write(&path, "vector<int> xs = ${};\nint x = ${};\nreturn x;").unwrap();

        let input = load(&path, None, &["[3,1,5]".to_string(), "5".to_string()]).unwrap();
        assert_eq!(input.language, Language::Cpp);
        assert_eq!(
            input.snippet.assemble(input.language),
            "vector<int> xs = { 3, 1, 5 };\nint x = 5;\nreturn x;"
        );
    }

    #[test]
    fn test_load_rejects_value_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.rs");
        std::fs::write(&path, "Ok::<i32, String>(${})").unwrap();

        let err = load(&path, None, &[]).unwrap_err();
        assert!(err.to_string().contains("1 placeholder(s) but 0"));
    }

    #[test]
    fn test_load_keeps_escaped_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fmt.rs");
        std::fs::write(&path, "Ok::<String, String>(format!(\"$${}\", ${}))").unwrap();

        let input = load(&path, None, &["7".to_string()]).unwrap();
        assert_eq!(
            input.snippet.assemble(input.language),
            "Ok::<String, String>(format!(\"${}\", 7))"
        );
        assert!(load(&path, None, &[]).is_err());
    }
}

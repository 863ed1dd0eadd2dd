//! Snippet templates and interpolation.
//!
//! A [`Snippet`] is an ordered list of literal fragments and an ordered list
//! of interpolated values, zipped positionally:
//!
//! ```text
//! fragment[0] value[0] fragment[1] value[1] ... fragment[n]
//! ```
//!
//! Values are substituted as raw text. Strings are not quoted or escaped,
//! so interpolation is textual substitution rather than parameterization:
//! whoever supplies a value is trusted as much as whoever wrote the snippet.
//!
//! When a template is parsed from text, every `${}` is a hole. Write `$${}`
//! for a literal `${}`.

use serde_json::Value;

use crate::error::{SnippetError, SnippetResult};
use crate::lang::Language;

/// Placeholder that marks a hole when a template is parsed from text.
pub const PLACEHOLDER: &str = "${}";

/// Escaped form of [`PLACEHOLDER`], parsed as literal text.
pub const ESCAPED_PLACEHOLDER: &str = "$${}";

/// Splits template text into literal fragments at each unescaped placeholder.
///
/// The result always has one more fragment than the template has holes.
pub fn split_template(template: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut rest = template;
    while let Some(idx) = rest.find(PLACEHOLDER) {
        let (before, after) = rest.split_at(idx);
        match before.strip_suffix('$') {
            Some(literal) => {
                current.push_str(literal);
                current.push_str(PLACEHOLDER);
            }
            None => {
                current.push_str(before);
                fragments.push(std::mem::take(&mut current));
            }
        }
        rest = &after[PLACEHOLDER.len()..];
    }
    current.push_str(rest);
    fragments.push(current);
    fragments
}

/// An interpolated template of foreign source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    fragments: Vec<String>,
    values: Vec<Value>,
}

impl Snippet {
    /// Creates a snippet from fragments and values.
    ///
    /// Fails unless there is exactly one more fragment than values.
    pub fn new(fragments: Vec<String>, values: Vec<Value>) -> SnippetResult<Self> {
        if fragments.len() != values.len() + 1 {
            return Err(SnippetError::InvalidTemplate {
                fragments: fragments.len(),
                values: values.len(),
            });
        }
        Ok(Self { fragments, values })
    }

    /// Creates a snippet with no interpolated values.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            fragments: vec![source.into()],
            values: Vec::new(),
        }
    }

    /// Splits `template` on [`PLACEHOLDER`] and fills the holes with `values`.
    ///
    /// [`ESCAPED_PLACEHOLDER`] stays in the source as a literal `${}`.
    pub fn parse_template(template: &str, values: Vec<Value>) -> SnippetResult<Self> {
        Self::new(split_template(template), values)
    }

    /// Starts building a snippet fragment by fragment.
    pub fn builder() -> SnippetBuilder {
        SnippetBuilder::default()
    }

    /// Literal fragments in order.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Interpolated values in order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Merges fragments and values into one source string.
    pub fn assemble(&self, language: Language) -> String {
        let mut out = String::new();
        for (i, fragment) in self.fragments.iter().enumerate() {
            out.push_str(fragment);
            if let Some(value) = self.values.get(i) {
                out.push_str(&render_value(value, language));
            }
        }
        out
    }
}

/// Renders an interpolated value as source text for `language`.
///
/// Scalars are stringified, arrays become aggregate literals (recursively),
/// objects fall back to compact JSON text. Strings are inserted verbatim.
pub fn render_value(value: &Value, language: Language) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(|v| render_value(v, language)).collect();
            language.aggregate_literal(&rendered)
        }
        Value::Object(_) => value.to_string(),
    }
}

/// Incremental [`Snippet`] builder.
#[derive(Debug, Default)]
pub struct SnippetBuilder {
    fragments: Vec<String>,
    values: Vec<Value>,
    current: String,
}

impl SnippetBuilder {
    /// Appends literal text to the current fragment.
    pub fn text(mut self, text: &str) -> Self {
        self.current.push_str(text);
        self
    }

    /// Closes the current fragment and adds an interpolated value.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.fragments.push(std::mem::take(&mut self.current));
        self.values.push(value.into());
        self
    }

    /// Finishes the snippet.
    pub fn build(mut self) -> Snippet {
        self.fragments.push(self.current);
        Snippet {
            fragments: self.fragments,
            values: self.values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_zip_order() {
        let snippet = Snippet::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![json!(1), json!(2)],
        )
        .unwrap();
        assert_eq!(snippet.assemble(Language::Rust), "a1b2c");
    }

    #[test]
    fn test_fragment_count_invariant() {
        let err = Snippet::new(vec!["a".into()], vec![json!(1)]).unwrap_err();
        assert!(matches!(
            err,
            SnippetError::InvalidTemplate {
                fragments: 1,
                values: 1
            }
        ));
        assert!(Snippet::new(vec![], vec![]).is_err());
    }

    #[test]
    fn test_collections_render_per_language() {
        let snippet = Snippet::builder()
            .text("vector<int> elements = ")
            .value(vec![3, 1, 5, 2])
            .text(";")
            .build();
        assert_eq!(
            snippet.assemble(Language::Cpp),
            "vector<int> elements = { 3, 1, 5, 2 };"
        );
        assert_eq!(
            snippet.assemble(Language::Rust),
            "vector<int> elements = [3, 1, 5, 2];"
        );
    }

    #[test]
    fn test_nested_collections() {
        let value = json!([[1, 2], [3]]);
        assert_eq!(render_value(&value, Language::Cpp), "{ { 1, 2 }, { 3 } }");
        assert_eq!(render_value(&value, Language::Rust), "[[1, 2], [3]]");
    }

    #[test]
    fn test_strings_are_not_escaped() {
        // Interpolation is textual: quotes and code in values land verbatim.
        let snippet = Snippet::builder()
            .text("let s = \"")
            .value("a\"; panic!(\"injected")
            .text("\";")
            .build();
        assert_eq!(
            snippet.assemble(Language::Rust),
            "let s = \"a\"; panic!(\"injected\";"
        );

        let list = json!(["x", "y"]);
        assert_eq!(render_value(&list, Language::Cpp), "{ x, y }");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(render_value(&json!(true), Language::Rust), "true");
        assert_eq!(render_value(&json!(2.5), Language::Cpp), "2.5");
        assert_eq!(render_value(&Value::Null, Language::Cpp), "null");
        assert_eq!(
            render_value(&json!({"k": 1}), Language::Rust),
            r#"{"k":1}"#
        );
    }

    #[test]
    fn test_parse_template() {
        let snippet =
            Snippet::parse_template("int x = ${}; int y = ${};", vec![json!(1), json!(2)])
                .unwrap();
        assert_eq!(snippet.fragments().len(), 3);
        assert_eq!(snippet.assemble(Language::Cpp), "int x = 1; int y = 2;");

        assert!(Snippet::parse_template("${}", vec![]).is_err());
    }

    #[test]
    fn test_escaped_placeholder_is_literal() {
        assert_eq!(
            split_template(r#"println!("$${}", ${});"#),
            vec![r#"println!("${}", "#.to_string(), ");".to_string()]
        );
        assert_eq!(split_template("$${}$${}"), vec!["${}${}".to_string()]);

        let snippet =
            Snippet::parse_template(r#"format!("$${}", ${})"#, vec![json!("x")]).unwrap();
        assert_eq!(snippet.assemble(Language::Rust), r#"format!("${}", x)"#);
        assert!(Snippet::parse_template("$${}", vec![json!(1)]).is_err());
    }

    #[test]
    fn test_from_source_has_no_values() {
        let snippet = Snippet::from_source("fn main() {}");
        assert!(snippet.values().is_empty());
        assert_eq!(snippet.assemble(Language::Rust), "fn main() {}");
    }
}

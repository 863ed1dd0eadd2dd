//! Wire protocol between generated entry points and the engine.
//!
//! A scaffolded snippet reports its outcome as a delimited block:
//!
//! ```text
//! stdout:  __JS_RESULT__=OK<<<EOT      stderr:  __JS_RESULT__=ERR<<<EOT
//!          <serialized value>                   <error text>
//!          EOT                                  EOT
//! ```
//!
//! Decoding follows a fixed search order:
//!
//! ```text
//! SearchOk ──found──▶ DecodeOk
//!    │
//!  missing
//!    ▼
//! SearchErr ──found──▶ DecodeErr
//!    │
//!  missing
//!    ▼
//! LegacyFallback ──exit 0──▶ LegacyOk
//!                └─exit≠0──▶ LegacyErr
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SnippetError;
use crate::result::RunResult;
use crate::runner::ExecutionOutcome;

/// Start marker for a success payload (stdout).
pub const START_OK: &str = "__JS_RESULT__=OK<<<EOT";

/// Start marker for an error payload (stderr).
pub const START_ERR: &str = "__JS_RESULT__=ERR<<<EOT";

/// End marker line shared by both payloads.
pub const END_MARKER: &str = "EOT";

/// Terminal state of result decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Success payload found on stdout.
    DecodeOk,
    /// Error payload found on stderr.
    DecodeErr,
    /// No payload; process exited successfully.
    LegacyOk,
    /// No payload; process exited with failure.
    LegacyErr,
}

impl Resolution {
    /// Returns the string identifier for this resolution.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::DecodeOk => "decode_ok",
            Resolution::DecodeErr => "decode_err",
            Resolution::LegacyOk => "legacy_ok",
            Resolution::LegacyErr => "legacy_err",
        }
    }
}

/// Outcome of decoding one process run.
#[derive(Debug)]
pub struct Decoded {
    /// Which terminal state the decoder reached.
    pub resolution: Resolution,
    /// The decoded value or error.
    pub result: RunResult<Value>,
}

/// Extracts the payload between `start` and the next `end` line.
///
/// The payload begins on the line after the start marker and runs up to
/// the first line that is exactly `end` (ignoring surrounding whitespace).
/// Returns `None` if either marker is missing.
pub fn extract_delimited<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let start_idx = text.find(start)?;
    let after_marker = start_idx + start.len();
    let content_start = match text[after_marker..].find('\n') {
        Some(offset) => after_marker + offset + 1,
        None => return None,
    };

    let mut cursor = content_start;
    for line in text[content_start..].split_inclusive('\n') {
        if line.trim() == end {
            return Some(text[content_start..cursor].trim());
        }
        cursor += line.len();
    }
    None
}

/// Parses a payload as JSON, keeping it as text when it is not JSON.
///
/// A string result that itself looks like a JSON object or array is parsed
/// a second time. Generated entry points fall back to debug formatting when
/// serialization fails, which can leave JSON wrapped in a string.
pub fn parse_payload(text: &str) -> Value {
    let value = serde_json::from_str::<Value>(text).unwrap_or_else(|_| Value::String(text.to_string()));
    reparse_nested(value)
}

fn reparse_nested(value: Value) -> Value {
    if let Value::String(s) = &value {
        let trimmed = s.trim();
        let looks_structured = (trimmed.starts_with('{') && trimmed.ends_with('}'))
            || (trimmed.starts_with('[') && trimmed.ends_with(']'));
        if looks_structured {
            if let Ok(inner) = serde_json::from_str::<Value>(trimmed) {
                return inner;
            }
        }
    }
    value
}

/// Decodes a process outcome into a result.
pub fn decode(outcome: &ExecutionOutcome) -> Decoded {
    if let Some(payload) = extract_delimited(&outcome.stdout, START_OK, END_MARKER) {
        return Decoded {
            resolution: Resolution::DecodeOk,
            result: RunResult::Ok(parse_payload(payload)),
        };
    }

    if let Some(payload) = extract_delimited(&outcome.stderr, START_ERR, END_MARKER) {
        let error = serde_json::from_str::<Value>(payload)
            .unwrap_or_else(|_| Value::String(payload.to_string()));
        return Decoded {
            resolution: Resolution::DecodeErr,
            result: RunResult::Err(SnippetError::RunFailed {
                code: outcome.code,
                stdout: outcome.stdout.clone(),
                stderr: outcome.stderr.clone(),
                error: Some(error),
            }),
        };
    }

    if !outcome.success {
        return Decoded {
            resolution: Resolution::LegacyErr,
            result: RunResult::Err(SnippetError::RunFailed {
                code: outcome.code,
                stdout: outcome.stdout.clone(),
                stderr: outcome.stderr.clone(),
                error: None,
            }),
        };
    }

    let value = if outcome.stdout.is_empty() {
        Value::String(String::new())
    } else {
        parse_payload(&outcome.stdout)
    };
    Decoded {
        resolution: Resolution::LegacyOk,
        result: RunResult::Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn outcome(code: i32, stdout: &str, stderr: &str) -> ExecutionOutcome {
        ExecutionOutcome {
            code: Some(code),
            success: code == 0,
            stdout: stdout.trim().to_string(),
            stderr: stderr.trim().to_string(),
        }
    }

    fn ok_block(payload: &str) -> String {
        format!("{}\n{}\n{}", START_OK, payload, END_MARKER)
    }

    fn err_block(payload: &str) -> String {
        format!("{}\n{}\n{}", START_ERR, payload, END_MARKER)
    }

    #[test]
    fn test_extract_delimited() {
        let text = format!("noise\n{}\nafter", ok_block("[1,2]"));
        assert_eq!(extract_delimited(&text, START_OK, END_MARKER), Some("[1,2]"));

        assert_eq!(extract_delimited("no markers", START_OK, END_MARKER), None);
        // Start marker without a terminating end line.
        let text = format!("{}\n42", START_OK);
        assert_eq!(extract_delimited(&text, START_OK, END_MARKER), None);
        // Start marker as the last line.
        assert_eq!(extract_delimited(START_OK, START_OK, END_MARKER), None);
    }

    #[test]
    fn test_extract_multiline_and_empty_payload() {
        let text = ok_block("line one\nline two");
        assert_eq!(
            extract_delimited(&text, START_OK, END_MARKER),
            Some("line one\nline two")
        );
        let text = format!("{}\n{}", START_OK, END_MARKER);
        assert_eq!(extract_delimited(&text, START_OK, END_MARKER), Some(""));
    }

    #[test]
    fn test_end_marker_must_be_whole_line() {
        let text = ok_block("\"REDOTS EOT inline\"");
        assert_eq!(
            extract_delimited(&text, START_OK, END_MARKER),
            Some("\"REDOTS EOT inline\"")
        );
    }

    #[test]
    fn test_decode_ok_structured() {
        let decoded = decode(&outcome(0, &ok_block(r#"[["a",1],["b",2]]"#), ""));
        assert_eq!(decoded.resolution, Resolution::DecodeOk);
        assert_eq!(decoded.result.unwrap(), json!([["a", 1], ["b", 2]]));
    }

    #[test]
    fn test_decode_ok_debug_text_stays_text() {
        let decoded = decode(&outcome(0, &ok_block(r#"[("a", 1)]"#), ""));
        assert_eq!(decoded.result.unwrap(), json!(r#"[("a", 1)]"#));
    }

    #[test]
    fn test_decode_double_encoded() {
        // A JSON string whose content is itself a JSON array.
        let decoded = decode(&outcome(0, &ok_block(r#""[1, 2, 3]""#), ""));
        assert_eq!(decoded.result.unwrap(), json!([1, 2, 3]));

        // Looks structured but is not valid JSON: kept as the inner string.
        let decoded = decode(&outcome(0, &ok_block(r#""{not json}""#), ""));
        assert_eq!(decoded.result.unwrap(), json!("{not json}"));
    }

    #[test]
    fn test_decode_err_payload() {
        let decoded = decode(&outcome(1, "", &err_block("\"boom\"")));
        assert_eq!(decoded.resolution, Resolution::DecodeErr);
        let err = decoded.result.unwrap_err();
        assert_eq!(err.error_value(), Some(&json!("boom")));
        assert_eq!(err.exit_code(), Some(1));
        assert_eq!(err.payload(), "boom");
    }

    #[test]
    fn test_decode_err_unparseable_payload_is_text() {
        let decoded = decode(&outcome(1, "", &err_block("ParseIntError { kind: InvalidDigit }")));
        let err = decoded.result.unwrap_err();
        assert_eq!(
            err.error_value(),
            Some(&json!("ParseIntError { kind: InvalidDigit }"))
        );
    }

    #[test]
    fn test_ok_marker_wins_over_err_marker() {
        let decoded = decode(&outcome(0, &ok_block("1"), &err_block("\"late\"")));
        assert_eq!(decoded.resolution, Resolution::DecodeOk);
    }

    #[test]
    fn test_legacy_ok() {
        let decoded = decode(&outcome(0, "hello world\n", ""));
        assert_eq!(decoded.resolution, Resolution::LegacyOk);
        assert_eq!(decoded.result.unwrap(), json!("hello world"));

        let decoded = decode(&outcome(0, "{\"a\": 1}", ""));
        assert_eq!(decoded.result.unwrap(), json!({"a": 1}));

        let decoded = decode(&outcome(0, "", ""));
        assert_eq!(decoded.result.unwrap(), json!(""));
    }

    #[test]
    fn test_legacy_err() {
        let decoded = decode(&outcome(3, "partial", "segfault-ish"));
        assert_eq!(decoded.resolution, Resolution::LegacyErr);
        let err = decoded.result.unwrap_err();
        assert_eq!(err.exit_code(), Some(3));
        assert!(err.error_value().is_none());
        assert_eq!(err.payload(), "segfault-ish");
    }
}

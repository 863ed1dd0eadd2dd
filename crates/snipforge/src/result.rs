//! The value handed back to callers.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SnippetError;

/// Outcome of running a snippet: exactly one of a value or an error.
///
/// This is a plain view over already-resolved data. None of its methods
/// perform I/O.
#[derive(Debug)]
pub enum RunResult<T = Value> {
    /// The snippet produced a value.
    Ok(T),
    /// The snippet failed at some stage.
    Err(SnippetError),
}

impl<T> RunResult<T> {
    /// Returns true if this is a success.
    pub fn is_ok(&self) -> bool {
        matches!(self, RunResult::Ok(_))
    }

    /// Returns true if this is a failure.
    pub fn is_err(&self) -> bool {
        matches!(self, RunResult::Err(_))
    }

    /// Returns the value, panicking with the most specific error payload on failure.
    #[track_caller]
    pub fn unwrap(self) -> T {
        match self {
            RunResult::Ok(value) => value,
            RunResult::Err(err) => panic!("{}", err.payload()),
        }
    }

    /// Returns the value, or `default` on failure.
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            RunResult::Ok(value) => value,
            RunResult::Err(_) => default,
        }
    }

    /// Returns the error, panicking if this is a success.
    #[track_caller]
    pub fn unwrap_err(self) -> SnippetError
    where
        T: std::fmt::Debug,
    {
        match self {
            RunResult::Ok(value) => panic!("called `unwrap_err` on a success: {:?}", value),
            RunResult::Err(err) => err,
        }
    }

    /// Borrows the value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            RunResult::Ok(value) => Some(value),
            RunResult::Err(_) => None,
        }
    }

    /// Borrows the error, if any.
    pub fn error(&self) -> Option<&SnippetError> {
        match self {
            RunResult::Ok(_) => None,
            RunResult::Err(err) => Some(err),
        }
    }

    /// Maps the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RunResult<U> {
        match self {
            RunResult::Ok(value) => RunResult::Ok(f(value)),
            RunResult::Err(err) => RunResult::Err(err),
        }
    }

    /// Converts into a standard [`Result`].
    pub fn into_result(self) -> Result<T, SnippetError> {
        self.into()
    }
}

impl RunResult<Value> {
    /// Deserializes the decoded value into `U`.
    ///
    /// A shape mismatch becomes a [`SnippetError::TypeMismatch`] failure.
    pub fn decode<U: DeserializeOwned>(self) -> RunResult<U> {
        match self {
            RunResult::Ok(value) => match serde_json::from_value(value) {
                Ok(typed) => RunResult::Ok(typed),
                Err(e) => RunResult::Err(SnippetError::TypeMismatch(e)),
            },
            RunResult::Err(err) => RunResult::Err(err),
        }
    }
}

impl<T> From<Result<T, SnippetError>> for RunResult<T> {
    fn from(result: Result<T, SnippetError>) -> Self {
        match result {
            Ok(value) => RunResult::Ok(value),
            Err(err) => RunResult::Err(err),
        }
    }
}

impl<T> From<RunResult<T>> for Result<T, SnippetError> {
    fn from(result: RunResult<T>) -> Self {
        match result {
            RunResult::Ok(value) => Ok(value),
            RunResult::Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failure() -> RunResult<Value> {
        RunResult::Err(SnippetError::RunFailed {
            code: Some(1),
            stdout: String::new(),
            stderr: "raw stderr".to_string(),
            error: Some(json!("division by zero")),
        })
    }

    #[test]
    fn test_predicates() {
        let ok: RunResult<Value> = RunResult::Ok(json!(4));
        assert!(ok.is_ok());
        assert!(!ok.is_err());
        assert!(failure().is_err());
    }

    #[test]
    fn test_unwrap_or_never_panics() {
        assert_eq!(failure().unwrap_or(json!(0)), json!(0));
        assert_eq!(RunResult::Ok(json!(4)).unwrap_or(json!(0)), json!(4));
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn test_unwrap_panics_with_decoded_payload() {
        failure().unwrap();
    }

    #[test]
    fn test_decode_typed() {
        let result = RunResult::Ok(json!([["a", 1], ["b", 2]]));
        let pairs: Vec<(String, u64)> = result.decode().unwrap();
        assert_eq!(pairs, vec![("a".to_string(), 1), ("b".to_string(), 2)]);

        let mismatch = RunResult::Ok(json!("text")).decode::<u32>();
        assert!(matches!(
            mismatch.error(),
            Some(SnippetError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_std_result_conversion() {
        let result: Result<Value, SnippetError> = failure().into_result();
        assert!(result.is_err());
        let back: RunResult<Value> = Ok(json!(1)).into();
        assert_eq!(back.value(), Some(&json!(1)));
    }
}

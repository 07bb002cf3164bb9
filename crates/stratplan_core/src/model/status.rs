//! Free-form planning/progress status codes.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const OK_CODE: &str = "OK";
const COMPLETED_CODE: &str = "COMPLETED";

/// Status code as stored on a planning node.
///
/// Any value other than `OK` (case-insensitive) marks a critical condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(String);

impl StatusCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Shorthand for the no-issue code.
    pub fn ok() -> Self {
        Self::new(OK_CODE)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns true when this code means "no critical issue".
    pub fn is_ok(&self) -> bool {
        self.0.eq_ignore_ascii_case(OK_CODE)
    }

    /// Returns true when this progress code marks finished work.
    pub fn is_completed(&self) -> bool {
        self.0.eq_ignore_ascii_case(COMPLETED_CODE)
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<&str> for StatusCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::StatusCode;

    #[test]
    fn ok_matches_case_insensitively() {
        assert!(StatusCode::new("ok").is_ok());
        assert!(StatusCode::new("Ok").is_ok());
        assert!(!StatusCode::new("ERROR").is_ok());
        assert!(!StatusCode::new("").is_ok());
    }

    #[test]
    fn completed_matches_case_insensitively() {
        assert!(StatusCode::new("completed").is_completed());
        assert!(!StatusCode::new("IN_PROGRESS").is_completed());
    }

    #[test]
    fn surrounding_whitespace_is_not_ignored() {
        for padded in [" OK ", "OK\n", "\tok"] {
            assert!(!StatusCode::new(padded).is_ok(), "{padded:?}");
        }
        assert!(!StatusCode::new("COMPLETED ").is_completed());
    }
}

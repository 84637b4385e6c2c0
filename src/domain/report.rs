//! The single JSON report written to stdout per invocation.

use serde::{Deserialize, Serialize};

/// Outcome of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Report {
    /// Transcript produced
    Success { transcript: String },

    /// Any failure, with a human-readable message
    Error { message: String },
}

impl Report {
    pub fn success(transcript: impl Into<String>) -> Self {
        Self::Success {
            transcript: transcript.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Serialize to a single line of JSON (no trailing newline)
    pub fn to_json_line(&self) -> String {
        // Serializing a two-string enum cannot fail; keep a literal fallback
        // so the one-line contract holds regardless.
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"status":"error","message":"Failed to serialize report"}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shape() {
        let report = Report::success("hello\nworld");
        assert_eq!(
            report.to_json_line(),
            r#"{"status":"success","transcript":"hello\nworld"}"#
        );
    }

    #[test]
    fn test_error_shape() {
        let report = Report::error("No call recordings matching");
        assert_eq!(
            report.to_json_line(),
            r#"{"status":"error","message":"No call recordings matching"}"#
        );
    }

    #[test]
    fn test_single_line_even_with_newlines() {
        let line = Report::success("a\nb\nc").to_json_line();
        assert_eq!(line.lines().count(), 1);
    }

    #[test]
    fn test_roundtrip_tag() {
        let parsed: Report =
            serde_json::from_str(r#"{"status":"error","message":"boom"}"#).unwrap();
        assert_eq!(parsed, Report::error("boom"));
        assert!(!parsed.is_success());
    }
}

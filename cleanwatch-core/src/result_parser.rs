//! Final-output payload parser.
//!
//! The cleaning process ends with a summary payload that is either a JSON object
//! or free text. [`parse`] turns it into zero or more classification events:
//! fields of a JSON object each produce their own event, and free text falls
//! back to two independent heuristics.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::types::{ClassificationResult, StructuredResult};

/// Message used when plain-text output only says the run went "successfully".
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Python script execution reported as successful.";

/// Message shown for a failed execution that carried no message of its own.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Python script execution failed.";

/// `type` value marking a payload as agent analysis.
pub const CODE_EXECUTION_RESULT: &str = "code_execution_result";

/// Path token: the first whitespace-delimited run, minus trailing `,` `;` `.`.
/// Interior punctuation stays part of the path.
pub(crate) const PATH_TOKEN: &str = r"([^\s]*[^\s,;.])";

static CLEANED_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"Cleaned data available at:\s+{PATH_TOKEN}"))
        .expect("cleaned-path pattern is valid")
});

/// Parses a final-output payload into classification events.
///
/// JSON objects are inspected field by field, in order: `output_path`, then
/// `success` (with `message`, defaulting to empty), then `type` ==
/// `code_execution_result` with `content`. Any other JSON value yields nothing.
/// Text that is not JSON goes through [`parse_plain_text`].
pub fn parse(raw: &str) -> Vec<ClassificationResult> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => events_from_structured(&StructuredResult::from_object(&map)),
        Ok(Value::Array(_)) | Ok(Value::Null) => Vec::new(),
        Ok(_) | Err(_) => parse_plain_text(raw),
    }
}

/// Plain-text fallback: a `Cleaned data available at: <path>` announcement and
/// the word `successfully` are checked independently; both may fire.
pub fn parse_plain_text(raw: &str) -> Vec<ClassificationResult> {
    let mut events = Vec::new();
    if let Some(caps) = CLEANED_PATH.captures(raw) {
        events.push(ClassificationResult::OutputPathFound { path: caps[1].to_owned() });
    }
    if raw.contains("successfully") {
        events.push(ClassificationResult::ExecutionResult {
            success: true,
            message: DEFAULT_SUCCESS_MESSAGE.to_owned(),
        });
    }
    events
}

/// Maps decoded fields to events. Fields are not mutually exclusive.
pub fn events_from_structured(result: &StructuredResult) -> Vec<ClassificationResult> {
    let mut events = Vec::new();
    if let Some(path) = &result.output_path {
        events.push(ClassificationResult::OutputPathFound { path: path.clone() });
    }
    if let Some(success) = result.success {
        events.push(ClassificationResult::ExecutionResult {
            success,
            message: result.message.clone().unwrap_or_default(),
        });
    }
    if result.kind.as_deref() == Some(CODE_EXECUTION_RESULT) {
        if let Some(content) = &result.content {
            events.push(ClassificationResult::AgentAnalysis { content: content.clone() });
        }
    }
    events
}

impl StructuredResult {
    /// Decodes the known fields from a JSON object.
    ///
    /// Empty strings count as absent for `output_path` and `content`, and
    /// `success` is only taken when it is a real boolean. A non-string
    /// `content` is kept as compact JSON, matching the embedded-payload rule.
    pub fn from_object(map: &Map<String, Value>) -> Self {
        Self {
            output_path: map
                .get("output_path")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            success: map.get("success").and_then(Value::as_bool),
            message: map.get("message").and_then(Value::as_str).map(str::to_owned),
            kind: map.get("type").and_then(Value::as_str).map(str::to_owned),
            content: map
                .get("content")
                .map(|value| content_text(Some(value)))
                .filter(|s| !s.is_empty()),
        }
    }
}

/// Renders a JSON `content` value as display text.
///
/// Strings are taken verbatim; anything else is shown as compact JSON, and a
/// missing field is empty.
pub(crate) fn content_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_with_path_and_success_yields_both_in_order() {
        let events = parse(r#"{"output_path": "/data/out.csv", "success": true}"#);
        assert_eq!(
            events,
            vec![
                ClassificationResult::OutputPathFound { path: "/data/out.csv".into() },
                ClassificationResult::ExecutionResult { success: true, message: String::new() },
            ]
        );
    }

    #[test]
    fn json_failure_carries_message() {
        let events = parse(r#"{"success": false, "message": "KeyError: 'name'"}"#);
        assert_eq!(
            events,
            vec![ClassificationResult::ExecutionResult {
                success: false,
                message: "KeyError: 'name'".into()
            }]
        );
    }

    #[test]
    fn json_analysis_requires_matching_type_and_content() {
        let events = parse(r#"{"type": "code_execution_result", "content": "3 nulls removed"}"#);
        assert_eq!(
            events,
            vec![ClassificationResult::AgentAnalysis { content: "3 nulls removed".into() }]
        );
        assert!(parse(r#"{"type": "code_execution_result"}"#).is_empty());
        assert!(parse(r#"{"type": "other", "content": "x"}"#).is_empty());
    }

    #[test]
    fn json_payload_can_produce_all_three_events() {
        let events = parse(
            r#"{"output_path": "/o.jsonl", "success": true, "message": "ok",
                "type": "code_execution_result", "content": "done"}"#,
        );
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], ClassificationResult::OutputPathFound { .. }));
        assert!(matches!(events[1], ClassificationResult::ExecutionResult { success: true, .. }));
        assert!(matches!(events[2], ClassificationResult::AgentAnalysis { .. }));
    }

    #[test]
    fn non_boolean_success_is_ignored() {
        assert!(parse(r#"{"success": "yes"}"#).is_empty());
    }

    #[test]
    fn json_object_skips_text_heuristics() {
        // A JSON object is never scanned as text, even if a string field matches.
        assert!(parse(r#"{"note": "finished successfully"}"#).is_empty());
    }

    #[test]
    fn plain_text_path_and_success_fire_independently() {
        let events = parse("Cleaned data available at: /tmp/clean.jsonl\nAll checks passed successfully.");
        assert_eq!(
            events,
            vec![
                ClassificationResult::OutputPathFound { path: "/tmp/clean.jsonl".into() },
                ClassificationResult::ExecutionResult {
                    success: true,
                    message: DEFAULT_SUCCESS_MESSAGE.into()
                },
            ]
        );
    }

    #[test]
    fn plain_text_path_drops_trailing_punctuation() {
        let events = parse("Cleaned data available at: /out.csv, job completed");
        assert_eq!(events, vec![ClassificationResult::OutputPathFound { path: "/out.csv".into() }]);
    }

    #[test]
    fn plain_text_path_keeps_interior_punctuation() {
        let events = parse("Cleaned data available at: /data/run;2/out.jsonl");
        assert_eq!(
            events,
            vec![ClassificationResult::OutputPathFound { path: "/data/run;2/out.jsonl".into() }]
        );
    }

    #[test]
    fn json_analysis_accepts_non_string_content() {
        let events = parse(r#"{"type": "code_execution_result", "content": {"rows": 3}}"#);
        assert_eq!(
            events,
            vec![ClassificationResult::AgentAnalysis { content: r#"{"rows":3}"#.into() }]
        );
        assert!(parse(r#"{"type": "code_execution_result", "content": ""}"#).is_empty());
        assert!(parse(r#"{"type": "code_execution_result", "content": null}"#).is_empty());
    }

    #[test]
    fn unstructured_text_yields_nothing() {
        assert!(parse("The dataset still has duplicate rows.").is_empty());
        assert!(parse("").is_empty());
    }

    #[test]
    fn malformed_json_falls_back_to_text() {
        let events = parse(r#"{"output_path": "/x" ... finished successfully"#);
        assert_eq!(
            events,
            vec![ClassificationResult::ExecutionResult {
                success: true,
                message: DEFAULT_SUCCESS_MESSAGE.into()
            }]
        );
    }

    #[test]
    fn content_text_handles_non_strings() {
        assert_eq!(content_text(Some(&Value::String("a".into()))), "a");
        assert_eq!(content_text(Some(&serde_json::json!({"rows": 3}))), r#"{"rows":3}"#);
        assert_eq!(content_text(None), "");
    }
}

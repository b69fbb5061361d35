//! crates/sermon_study_core/src/extract.rs
//!
//! Recovers JSON values embedded in free-form model text.
//!
//! Even when the adapter requested native structured output, the response
//! is treated as untrusted: the widest brace-matched span is located first
//! (models like to wrap JSON in prose), then the parsed value is shape
//! checked explicitly instead of trusting the model to honor the schema.

use serde_json::Value;

use crate::domain::{ContentAnalysis, RawStudyEntry};
use crate::ports::{PortError, PortResult};

/// Locates the first `{` through the last `}` in `text` and parses the
/// span as JSON. The widest span is used deliberately so prose before and
/// after the value is ignored.
pub fn extract_object(text: &str) -> PortResult<Value> {
    extract_delimited(text, '{', '}')
}

/// Locates the first `[` through the last `]` in `text` and parses the
/// span as JSON.
pub fn extract_array(text: &str) -> PortResult<Value> {
    extract_delimited(text, '[', ']')
}

fn extract_delimited(text: &str, open: char, close: char) -> PortResult<Value> {
    let start = text.find(open);
    let end = text.rfind(close);
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if s < e => (s, e),
        _ => {
            return Err(PortError::MalformedOutput(format!(
                "no {open}...{close} span found in model output"
            )))
        }
    };

    serde_json::from_str(&text[start..=end])
        .map_err(|e| PortError::MalformedOutput(format!("captured span is not valid JSON: {e}")))
}

/// Parses the thematic-analysis response: a JSON object with `themes`
/// (non-empty array of strings) and `scriptures` (array of strings).
pub fn parse_content_analysis(text: &str) -> PortResult<ContentAnalysis> {
    let value = extract_object(text)?;

    let themes = string_array(&value, "themes")?;
    if themes.is_empty() {
        return Err(PortError::MalformedOutput(
            "analysis object has an empty \"themes\" array".to_string(),
        ));
    }
    let scriptures = string_array(&value, "scriptures")?;

    Ok(ContentAnalysis { themes, scriptures })
}

/// Parses the study-plan response: a JSON array of objects. The top-level
/// shape is enforced here; individual fields stay optional and fall back
/// to defaults in the assembler.
pub fn parse_study_entries(text: &str) -> PortResult<Vec<RawStudyEntry>> {
    let value = extract_array(text)?;

    let items = value.as_array().ok_or_else(|| {
        PortError::MalformedOutput("study response is not a JSON array".to_string())
    })?;

    items
        .iter()
        .map(|item| {
            let obj = item.as_object().ok_or_else(|| {
                PortError::MalformedOutput("study array contains a non-object entry".to_string())
            })?;
            // Wrong-typed fields are treated as absent, the same as missing ones.
            Ok(RawStudyEntry {
                day: obj.get("day").and_then(Value::as_u64).map(|d| d as u8),
                title: obj.get("title").and_then(Value::as_str).map(str::to_string),
                passage: obj
                    .get("passage")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                content: obj
                    .get("content")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}

fn string_array(value: &Value, field: &str) -> PortResult<Vec<String>> {
    let items = value
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            PortError::MalformedOutput(format!(
                "analysis object is missing an array field \"{field}\""
            ))
        })?;

    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                PortError::MalformedOutput(format!(
                    "analysis field \"{field}\" contains a non-string entry"
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_is_recovered_from_surrounding_prose() {
        let text = r#"Sure! Here's the plan: [{"day":1,"title":"Foundation"}] Hope that helps!"#;
        let entries = parse_study_entries(text).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].day, Some(1));
        assert_eq!(entries[0].title.as_deref(), Some("Foundation"));
    }

    #[test]
    fn missing_bracket_pair_is_malformed() {
        let err = extract_array("no json here at all").unwrap_err();
        assert!(matches!(err, PortError::MalformedOutput(_)));
    }

    #[test]
    fn invalid_json_span_is_malformed() {
        let err = extract_array("prefix [not json] suffix").unwrap_err();
        assert!(matches!(err, PortError::MalformedOutput(_)));
    }

    #[test]
    fn analysis_object_is_recovered_and_validated() {
        let text = r#"Here you go: {"themes":["Grace","Hope"],"scriptures":["John 3:16"]}"#;
        let analysis = parse_content_analysis(text).unwrap();
        assert_eq!(analysis.themes, vec!["Grace", "Hope"]);
        assert_eq!(analysis.scriptures, vec!["John 3:16"]);
    }

    #[test]
    fn analysis_with_non_string_theme_is_malformed() {
        let text = r#"{"themes":[1,2],"scriptures":[]}"#;
        let err = parse_content_analysis(text).unwrap_err();
        assert!(matches!(err, PortError::MalformedOutput(_)));
    }

    #[test]
    fn analysis_with_empty_themes_is_malformed() {
        let text = r#"{"themes":[],"scriptures":["John 3:16"]}"#;
        let err = parse_content_analysis(text).unwrap_err();
        assert!(matches!(err, PortError::MalformedOutput(_)));
    }

    #[test]
    fn non_object_entry_is_malformed() {
        let err = parse_study_entries(r#"["just a string"]"#).unwrap_err();
        assert!(matches!(err, PortError::MalformedOutput(_)));
    }

    #[test]
    fn wrong_typed_entry_fields_are_treated_as_absent() {
        let entries = parse_study_entries(r#"[{"day":"one","title":42}]"#).unwrap();
        assert_eq!(entries[0].day, None);
        assert_eq!(entries[0].title, None);
    }
}

//! Classifier Response Parsing
//!
//! The classifier is a best-effort text generator, so the JSON it returns is
//! not contractually fixed. This module normalizes the shapes seen in practice
//! into a single list of indices.
//!
//! Accepted shapes, in the order they are tried:
//!
//! 1. `{"result": [..]}`: object whose `result` is the index list
//! 2. `{"result": {"indices": [..]}}`: object whose `result` nests the list
//!    (a missing `indices` key means "no indices")
//! 3. `[{"result": ..}]`: a single-element list holding an object is unwrapped
//!    to that object and tried as (1) or (2)
//! 4. `[1, 2, 3]`: any other list is itself the result
//!
//! Markdown code fences (```` ```json ```` / ```` ``` ````) are stripped first.
//! Anything else is a [`CoreError::MalformedResponse`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::core::{CoreError, CoreResult};

static FENCE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"```(?:json|JSON)?").unwrap()
});

/// Top-level shape of a decoded response
#[derive(Debug, PartialEq)]
enum ResponseShape {
    /// A JSON object carrying a `result` field
    Object(Map<String, Value>),
    /// A bare list treated as the result itself
    BareList(Vec<Value>),
}

/// Shape of the `result` field
#[derive(Debug, PartialEq)]
enum ResultField {
    /// `result` is the index list
    List(Vec<Value>),
    /// `result` is an object that may carry `indices`
    Nested(Map<String, Value>),
}

/// Removes code-fence markers and surrounding whitespace
pub fn strip_code_fences(raw: &str) -> String {
    FENCE_MARKERS.replace_all(raw, "").trim().to_string()
}

/// Parses classifier text into the list of indices it names.
///
/// Indices are returned exactly as the classifier listed them: possibly
/// unsorted, duplicated, negative or out of range. Range filtering is the
/// caller's job.
pub fn parse_indices(raw: &str) -> CoreResult<Vec<i64>> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| CoreError::malformed(format!("invalid JSON: {}", e), raw))?;

    let shape = classify_shape(value)
        .ok_or_else(|| CoreError::malformed("expected a JSON object or list", raw))?;

    let items = match shape {
        ResponseShape::BareList(items) => items,
        ResponseShape::Object(object) => match read_result(object, raw)? {
            ResultField::List(items) => items,
            ResultField::Nested(mut nested) => match nested.remove("indices") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items,
                Some(other) => {
                    return Err(CoreError::malformed(
                        format!("`indices` must be a list, got {}", type_name(&other)),
                        raw,
                    ))
                }
            },
        },
    };

    items
        .iter()
        .map(|item| {
            to_index(item).ok_or_else(|| {
                CoreError::malformed(format!("not an integer index: {}", item), raw)
            })
        })
        .collect()
}

fn classify_shape(value: Value) -> Option<ResponseShape> {
    match value {
        Value::Object(object) => Some(ResponseShape::Object(object)),
        Value::Array(mut items) => {
            if items.len() == 1 && items[0].is_object() {
                match items.pop() {
                    Some(Value::Object(object)) => Some(ResponseShape::Object(object)),
                    _ => None,
                }
            } else {
                Some(ResponseShape::BareList(items))
            }
        }
        _ => None,
    }
}

fn read_result(mut object: Map<String, Value>, raw: &str) -> CoreResult<ResultField> {
    match object.remove("result") {
        Some(Value::Array(items)) => Ok(ResultField::List(items)),
        Some(Value::Object(nested)) => Ok(ResultField::Nested(nested)),
        Some(other) => Err(CoreError::malformed(
            format!("`result` must be a list or object, got {}", type_name(&other)),
            raw,
        )),
        None => Err(CoreError::malformed("missing `result` field", raw)),
    }
}

/// Accepts integers, integral-looking floats and numeric strings
fn to_index(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Accepted Shapes
    // -------------------------------------------------------------------------

    #[test]
    fn test_object_with_result_list() {
        assert_eq!(parse_indices(r#"{"result": [1, 2, 5]}"#).unwrap(), vec![1, 2, 5]);
    }

    #[test]
    fn test_object_with_nested_indices() {
        let raw = r#"{"result": {"indices": [3, 4]}}"#;
        assert_eq!(parse_indices(raw).unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_nested_object_without_indices_is_empty() {
        assert!(parse_indices(r#"{"result": {}}"#).unwrap().is_empty());
    }

    #[test]
    fn test_single_object_list_is_unwrapped() {
        let raw = r#"[{"result": [7, 8]}]"#;
        assert_eq!(parse_indices(raw).unwrap(), vec![7, 8]);
    }

    #[test]
    fn test_bare_list_is_result() {
        assert_eq!(parse_indices("[4, 2, 2]").unwrap(), vec![4, 2, 2]);
        assert!(parse_indices("[]").unwrap().is_empty());
    }

    #[test]
    fn test_list_of_several_objects_is_not_unwrapped() {
        // Wrapped as the result list, whose items are then not indices.
        let raw = r#"[{"result": [1]}, {"result": [2]}]"#;
        assert!(matches!(
            parse_indices(raw),
            Err(CoreError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_code_fences_are_stripped() {
        let raw = "```json\n{\"result\": [0, 9]}\n```";
        assert_eq!(parse_indices(raw).unwrap(), vec![0, 9]);

        let plain_fence = "```\n[1]\n```";
        assert_eq!(parse_indices(plain_fence).unwrap(), vec![1]);
    }

    #[test]
    fn test_lenient_index_values() {
        let raw = r#"{"result": [1, "2", 3.0, " 4 "]}"#;
        assert_eq!(parse_indices(raw).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_negative_indices_pass_through() {
        assert_eq!(parse_indices("[-1, 0]").unwrap(), vec![-1, 0]);
    }

    // -------------------------------------------------------------------------
    // Rejected Shapes
    // -------------------------------------------------------------------------

    #[test]
    fn test_scalar_is_malformed() {
        let err = parse_indices("42").unwrap_err();
        match err {
            CoreError::MalformedResponse { window, raw, .. } => {
                assert_eq!(window, None);
                assert_eq!(raw, "42");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_result_is_malformed() {
        assert!(matches!(
            parse_indices(r#"{"indices": [1]}"#),
            Err(CoreError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_scalar_result_is_malformed() {
        assert!(parse_indices(r#"{"result": 3}"#).is_err());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = parse_indices("Sure! Here are the indices: 1, 2").unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_non_numeric_index_is_malformed() {
        assert!(parse_indices(r#"{"result": ["intro"]}"#).is_err());
        assert!(parse_indices(r#"{"result": [null]}"#).is_err());
    }

    #[test]
    fn test_indices_must_be_list() {
        assert!(parse_indices(r#"{"result": {"indices": "1,2"}}"#).is_err());
    }
}

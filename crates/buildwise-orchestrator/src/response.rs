//! Structured-response validation.
//!
//! A `ResponseSchema` is the set of top-level keys a model reply must contain. Values are
//! not type-checked and nested objects are not inspected.

use crate::error::InvalidResponse;
use serde_json::{Map, Value};

/// Required top-level keys of an agent's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseSchema {
    required: &'static [&'static str],
}

impl ResponseSchema {
    /// Creates a schema from its required keys.
    pub const fn new(required: &'static [&'static str]) -> Self {
        Self { required }
    }

    /// The required keys, in declaration order.
    pub const fn required(&self) -> &'static [&'static str] {
        self.required
    }

    /// Returns the required keys the object lacks.
    pub fn missing_keys(&self, object: &Map<String, Value>) -> Vec<String> {
        self.required
            .iter()
            .filter(|key| !object.contains_key(**key))
            .map(|key| (*key).to_string())
            .collect()
    }

    /// Checks that an object carries every required key.
    pub fn validate(&self, object: &Map<String, Value>) -> Result<(), InvalidResponse> {
        let missing = self.missing_keys(object);
        if missing.is_empty() { Ok(()) } else { Err(InvalidResponse::MissingKeys(missing)) }
    }

    /// Parses model text into a validated JSON object.
    ///
    /// A Markdown code fence around the JSON is tolerated.
    pub fn parse(&self, text: &str) -> Result<Map<String, Value>, InvalidResponse> {
        let body = strip_code_fence(text);
        let value: Value =
            serde_json::from_str(body).map_err(|e| InvalidResponse::NotJson(e.to_string()))?;

        let Value::Object(object) = value else {
            return Err(InvalidResponse::NotAnObject(kind_of(&value)));
        };

        self.validate(&object)?;
        Ok(object)
    }
}

/// Removes a surrounding Markdown code fence (```json ... ```), if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json"), whether or not a newline follows it.
    let body = match body.split_once('\n') {
        Some((info, rest)) if !info.contains(['{', '[']) => rest,
        _ => body.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    body.trim()
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COST: ResponseSchema = ResponseSchema::new(&[
        "total_estimated_cost_usd",
        "cost_breakdown",
        "procurement_strategy",
    ]);

    #[test]
    fn test_parse_valid_object() {
        let object = COST
            .parse(r#"{"total_estimated_cost_usd": 1, "cost_breakdown": {}, "procurement_strategy": "local", "extra": true}"#)
            .unwrap();
        assert_eq!(object.get("extra"), Some(&json!(true)));
    }

    #[test]
    fn test_parse_not_json() {
        assert!(matches!(COST.parse("not json"), Err(InvalidResponse::NotJson(_))));
        assert!(matches!(COST.parse(""), Err(InvalidResponse::NotJson(_))));
    }

    #[test]
    fn test_parse_not_an_object() {
        assert_eq!(COST.parse("[1, 2]"), Err(InvalidResponse::NotAnObject("array")));
        assert_eq!(COST.parse("\"text\""), Err(InvalidResponse::NotAnObject("string")));
    }

    #[test]
    fn test_parse_missing_keys() {
        let result = COST.parse(r#"{"total_estimated_cost_usd": 1}"#);
        assert_eq!(
            result,
            Err(InvalidResponse::MissingKeys(vec![
                "cost_breakdown".to_string(),
                "procurement_strategy".to_string()
            ]))
        );
    }

    #[test]
    fn test_null_values_count_as_present() {
        let object = COST.parse(
            r#"{"total_estimated_cost_usd": null, "cost_breakdown": null, "procurement_strategy": null}"#,
        );
        assert!(object.is_ok());
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json {\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json{\n\"a\": 1\n}```"), "{\n\"a\": 1\n}");
        assert_eq!(strip_code_fence("```{\n\"a\": 1}```"), "{\n\"a\": 1}");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json {\"a\": 1}"), "```json {\"a\": 1}");
    }

    #[test]
    fn test_fenced_reply_parses() {
        let text = "```json\n{\"total_estimated_cost_usd\": 5, \"cost_breakdown\": {}, \"procurement_strategy\": \"x\"}\n```";
        assert!(COST.parse(text).is_ok());
    }
}

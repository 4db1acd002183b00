//! Turning completion text into a discovery payload.
//!
//! Models wrap JSON in code fences, leave trailing commas and comments
//! behind, and get cut off mid-object when they hit their output limit.
//! [`parse_payload`] handles all three; [`salvage_json`] is the last resort
//! for truncated bodies and may return an object that is missing its tail.

use crate::error::{DiscoveryError, Result};
use crate::models::{ApiEndpoint, ApiParameter};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiscoveryPayload {
    pub company_name: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub has_api: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub api_type: String,
    #[serde(deserialize_with = "lenient_string")]
    pub base_url: String,
    #[serde(deserialize_with = "lenient_records")]
    pub endpoints: Vec<RawEndpoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEndpoint {
    #[serde(deserialize_with = "lenient_string")]
    pub method: String,
    #[serde(deserialize_with = "lenient_string")]
    pub path: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_records")]
    pub parameters: Vec<RawParameter>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawParameter {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub param_type: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub required: bool,
}

impl RawEndpoint {
    /// Converts into a domain endpoint, dropping records without a method or path.
    pub fn into_endpoint(self) -> Option<ApiEndpoint> {
        if self.method.trim().is_empty() || self.path.trim().is_empty() {
            return None;
        }

        let parameters = self
            .parameters
            .into_iter()
            .filter(|param| !param.name.trim().is_empty())
            .map(|param| ApiParameter {
                name: param.name.trim().to_string(),
                param_type: param.param_type.trim().to_string(),
                required: param.required,
            })
            .collect();

        Some(ApiEndpoint::new(&self.method, &self.path, self.description.trim()).with_parameters(parameters))
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::String(text) => matches!(text.trim().to_lowercase().as_str(), "true" | "yes" | "y"),
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

/// Decodes a list element by element, skipping elements that do not decode.
/// `null` or a non-array value yields an empty list.
fn lenient_records<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Strips a surrounding code fence. A fence missing its closing marker keeps the rest of the text.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();

    let body_start = if let Some(start) = trimmed.find("```json") {
        start + "```json".len()
    } else if let Some(start) = trimmed.find("```") {
        start + 3
    } else {
        return trimmed;
    };

    let rest = &trimmed[body_start..];
    match rest.find("```") {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}

/// Removes `//` and `/* */` comments and commas that directly precede `}` or `]`.
///
/// String literals are left untouched, so URLs like `https://...` survive.
pub fn clean_json(text: &str) -> String {
    strip_trailing_commas(&strip_comments(text))
}

fn strip_comments(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        match (c, chars.get(i + 1)) {
            ('/', Some('/')) => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            ('/', Some('*')) => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(chars.len());
            }
            _ => {
                in_string = c == '"';
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }

    out
}

/// Appends the closers needed to balance every `{` and `[` left open, ignoring brackets in strings.
fn close_open_brackets(candidate: &str) -> String {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in candidate.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                stack.pop();
            }
            _ => {}
        }
    }

    let mut closed = candidate.trim_end().to_string();
    closed.extend(stack.into_iter().rev());
    closed
}

/// Best-effort recovery of a JSON object from a malformed or truncated body.
///
/// Takes the span from the first `{` to the last `}` (or to the end of the
/// text when no closing brace follows), then tries that span and each
/// shorter line-wise prefix, balancing brackets and cleaning before decoding.
pub fn salvage_json(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = match text.rfind('}') {
        Some(close) if close > start => close + 1,
        _ => text.len(),
    };
    let span = &text[start..end];

    let mut lines: Vec<&str> = span.lines().collect();
    while !lines.is_empty() {
        let candidate = lines.join("\n");
        let repaired = clean_json(&close_open_brackets(&candidate));
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&repaired) {
            debug!(kept_lines = lines.len(), "Salvaged truncated JSON");
            return Some(value);
        }
        lines.pop();
    }

    None
}

/// Decodes a completion into a payload, salvaging malformed JSON where possible.
///
/// Follow-up rounds may answer with a bare array of endpoints; that is
/// accepted as the `endpoints` field of an otherwise empty payload.
pub fn parse_payload(content: &str) -> Result<DiscoveryPayload> {
    let body = strip_code_fence(content);
    let cleaned = clean_json(body);

    let value = match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "Completion is not valid JSON, attempting salvage");
            salvage_json(body).ok_or_else(|| DiscoveryError::Parse(err.to_string()))?
        }
    };

    let value = match value {
        Value::Array(items) => serde_json::json!({ "endpoints": items }),
        other => other,
    };

    serde_json::from_value(value).map_err(|err| DiscoveryError::Parse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE_BODY: &str = r#"{
  "company_name": "Acme",
  "has_api": true,
  "api_type": "REST",
  "base_url": "https://api.acme.test/v1",
  "endpoints": [
    {"method": "GET", "path": "/users", "description": "List users"},
    {"method": "POST", "path": "/users", "description": "Create user"}
  ]
}"#;

    #[test]
    fn strips_json_fence() {
        let content = "Here you go:\n```json\n{\"has_api\": true}\n```\nEnjoy";
        assert_eq!(strip_code_fence(content), "{\"has_api\": true}");
    }

    #[test]
    fn strips_plain_fence() {
        let content = "```\n{\"has_api\": false}\n```";
        assert_eq!(strip_code_fence(content), "{\"has_api\": false}");
    }

    #[test]
    fn unterminated_fence_keeps_remainder() {
        let content = "```json\n{\"has_api\": true, \"endpoints\": [";
        assert_eq!(strip_code_fence(content), "{\"has_api\": true, \"endpoints\": [");
    }

    #[test]
    fn cleanup_removes_comments_and_trailing_commas() {
        let text = r#"{
  // the base
  "base_url": "https://api.acme.test", /* inline */
  "endpoints": [1, 2,], // trailing
}"#;
        let value: Value = serde_json::from_str(&clean_json(text)).unwrap();
        assert_eq!(value["base_url"], "https://api.acme.test");
        assert_eq!(value["endpoints"], serde_json::json!([1, 2]));
    }

    #[test]
    fn cleanup_leaves_string_contents_alone() {
        let text = r#"{"description": "a, ] b // not a comment"}"#;
        assert_eq!(clean_json(text), text);
    }

    #[test]
    fn salvage_recovers_object_truncated_by_ten_characters() {
        let truncated = &COMPLETE_BODY[..COMPLETE_BODY.len() - 10];
        assert!(serde_json::from_str::<Value>(truncated).is_err());

        let value = salvage_json(truncated).expect("salvage should recover");
        assert_eq!(value["company_name"], "Acme");
        assert_eq!(value["base_url"], "https://api.acme.test/v1");

        let endpoints = value["endpoints"].as_array().unwrap();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0]["path"], "/users");
        assert_eq!(endpoints[0]["method"], "GET");
    }

    #[test]
    fn salvage_gives_up_without_an_object() {
        assert!(salvage_json("no json here").is_none());
        assert!(salvage_json("{\"unterminated").is_none());
    }

    #[test]
    fn parse_payload_handles_fenced_and_truncated_completion() {
        let truncated = &COMPLETE_BODY[..COMPLETE_BODY.len() - 10];
        let content = format!("```json\n{truncated}");

        let payload = parse_payload(&content).unwrap();
        assert!(payload.has_api);
        assert_eq!(payload.api_type, "REST");
        assert_eq!(payload.endpoints.len(), 1);
    }

    #[test]
    fn parse_payload_accepts_bare_array() {
        let payload =
            parse_payload(r#"[{"method": "delete", "path": "/users/{id}", "description": "Remove"}]"#)
                .unwrap();
        assert!(!payload.has_api);
        assert_eq!(payload.endpoints.len(), 1);

        let endpoint = payload.endpoints[0].clone().into_endpoint().unwrap();
        assert_eq!(endpoint.full_endpoint(), "DELETE /users/{id}");
    }

    #[test]
    fn parse_payload_reports_unrecoverable_text() {
        let err = parse_payload("I could not find anything.").unwrap_err();
        assert!(matches!(err, DiscoveryError::Parse(_)));
    }

    #[test]
    fn lenient_fields_tolerate_model_quirks() {
        let payload = parse_payload(
            r#"{"has_api": "Yes", "api_type": null, "endpoints": [
                {"method": "GET", "path": "/a", "parameters": [{"name": "id", "type": "string", "required": "true"}]},
                {"method": "GET"},
                {"path": "/b"}
            ]}"#,
        )
        .unwrap();

        assert!(payload.has_api);
        assert_eq!(payload.api_type, "");

        let endpoints: Vec<_> = payload
            .endpoints
            .into_iter()
            .filter_map(RawEndpoint::into_endpoint)
            .collect();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].parameters[0].name, "id");
        assert!(endpoints[0].parameters[0].required);
    }

    #[test]
    fn null_parameters_do_not_discard_the_payload() {
        let payload = parse_payload(
            r#"{"has_api": true, "endpoints": [
                {"method": "GET", "path": "/users", "parameters": [{"name": "page", "type": "integer"}]},
                {"method": "POST", "path": "/users", "parameters": null}
            ]}"#,
        )
        .unwrap();

        assert_eq!(payload.endpoints.len(), 2);
        assert_eq!(payload.endpoints[0].parameters.len(), 1);
        assert!(payload.endpoints[1].parameters.is_empty());
    }

    #[test]
    fn null_or_scalar_endpoints_decode_as_empty() {
        let payload = parse_payload(r#"{"has_api": true, "api_type": "REST", "endpoints": null}"#).unwrap();
        assert!(payload.has_api);
        assert!(payload.endpoints.is_empty());

        let payload = parse_payload(r#"{"has_api": true, "endpoints": "see docs"}"#).unwrap();
        assert!(payload.endpoints.is_empty());
    }

    #[test]
    fn malformed_records_are_skipped_individually() {
        let payload = parse_payload(
            r#"{"has_api": true, "endpoints": [
                {"method": "GET", "path": "/users"},
                "POST /users",
                42,
                {"method": "DELETE", "path": "/users/{id}", "parameters": [
                    "id",
                    {"name": "id", "type": "string", "required": true}
                ]}
            ]}"#,
        )
        .unwrap();

        let endpoints: Vec<_> = payload
            .endpoints
            .into_iter()
            .filter_map(RawEndpoint::into_endpoint)
            .collect();
        let rendered: Vec<String> = endpoints.iter().map(ApiEndpoint::full_endpoint).collect();
        assert_eq!(rendered, vec!["GET /users", "DELETE /users/{id}"]);
        assert_eq!(endpoints[1].parameters.len(), 1);
        assert_eq!(endpoints[1].parameters[0].name, "id");
    }
}

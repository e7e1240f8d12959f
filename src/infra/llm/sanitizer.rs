//! Best-effort recovery of a JSON object from free-form model output.
//!
//! Model text is non-deterministic, so [`safe_parse_json`] never fails: anything it cannot
//! recover degrades to the caller's fallback object tagged with [`PARSE_FAILED_MARKER`] under
//! [`ERROR_KEY`] and a short raw sample under [`RAW_KEY`].

use serde_json::{Map, Value};
use thiserror::Error;

use super::response_parsing::{extract_json_payload, strip_code_fences, strip_control_characters};

pub const PARSE_FAILED_MARKER: &str = "AI_JSON_PARSE_FAILED";
pub const ERROR_KEY: &str = "__error";
pub const RAW_KEY: &str = "__raw";

const RAW_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("empty AI response")]
    Empty,
    #[error("no JSON object found in response")]
    NoJsonObject,
    #[error("invalid JSON: {message}")]
    Parse { message: String },
    #[error("parsed JSON is not an object")]
    NotAnObject,
    #[error("missing required key: {key}")]
    MissingKey { key: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SanitizeOptions {
    pub fallback: Map<String, Value>,
    pub required_keys: Vec<String>,
}

impl SanitizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-object values are ignored; the fallback is always an object.
    pub fn with_fallback(mut self, fallback: Value) -> Self {
        if let Value::Object(map) = fallback {
            self.fallback = map;
        }
        self
    }

    pub fn require<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_keys.extend(keys.into_iter().map(Into::into));
        self
    }
}

/// Strict variant of [`safe_parse_json`] that reports why recovery failed.
pub fn try_parse_json(
    raw: &str,
    required_keys: &[String],
) -> Result<Map<String, Value>, SanitizeError> {
    if raw.trim().is_empty() {
        return Err(SanitizeError::Empty);
    }

    let cleaned = strip_code_fences(raw);
    let payload = extract_json_payload(&cleaned).ok_or(SanitizeError::NoJsonObject)?;
    let payload = strip_control_characters(payload);

    let parsed: Value = serde_json::from_str(&payload).map_err(|err| SanitizeError::Parse {
        message: err.to_string(),
    })?;
    let Value::Object(object) = parsed else {
        return Err(SanitizeError::NotAnObject);
    };

    if let Some(key) = required_keys.iter().find(|key| !object.contains_key(key.as_str())) {
        return Err(SanitizeError::MissingKey { key: key.clone() });
    }

    Ok(object)
}

pub fn safe_parse_json(raw: &str, options: &SanitizeOptions) -> Map<String, Value> {
    match try_parse_json(raw, &options.required_keys) {
        Ok(object) => object,
        Err(error) => {
            let preview = raw_preview(raw);
            tracing::warn!(%error, raw_preview = %preview, "AI JSON parse failure");

            let mut degraded = options.fallback.clone();
            degraded.insert(
                ERROR_KEY.to_string(),
                Value::String(PARSE_FAILED_MARKER.to_string()),
            );
            degraded.insert(RAW_KEY.to_string(), Value::String(preview));
            degraded
        }
    }
}

pub fn is_parse_failure(object: &Map<String, Value>) -> bool {
    object.get(ERROR_KEY).and_then(Value::as_str) == Some(PARSE_FAILED_MARKER)
}

fn raw_preview(raw: &str) -> String {
    raw.chars().take(RAW_PREVIEW_CHARS).collect()
}

//! Purpose: Best-effort JSON extraction from model output text.
//! Exports: `extract`.
//! Role: Decode boundary between raw model text and structured values.
//! Invariants: `extract` never panics and never returns an error; failures are `None`.
//! Invariants: Fence stripping is a strict no-op when the text does not start with ```.
//! Notes: Decode failures are logged at debug level together with the original input.

use serde_json::Value;

use crate::core::error::{Error, ErrorKind};

/// Strips a Markdown code fence from around `text`.
///
/// When `text` starts with ``` the opening marker is removed, together with an
/// optional `json` or `javascript` tag and the newline after it, and a closing
/// ``` at the very end of the text is removed if present. Text that does not
/// start with a fence is returned unchanged, trailing backticks included.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("javascript"))
        .unwrap_or(rest);
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest)
}

fn decode(text: &str) -> Result<Value, Error> {
    serde_json::from_str(text).map_err(|err| {
        Error::new(ErrorKind::Corrupt)
            .with_message("model output is not valid json")
            .with_source(err)
    })
}

/// Extracts a JSON value from model output text.
///
/// The input is trimmed, one surrounding ``` code fence is stripped if present,
/// and the remainder is decoded. Absent input, blank input, and undecodable
/// input all yield `None`; this function never panics and never surfaces an
/// error to the caller. The distinction between "no value" and a decoded JSON
/// `null` is preserved: `extract(Some("null"))` is `Some(Value::Null)`.
pub fn extract(text: Option<&str>) -> Option<Value> {
    let raw = text.unwrap_or_default();
    match decode(strip_code_fence(raw.trim())) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(input = raw, error = %err, "failed to extract json from model output");
            None
        }
    }
}

//! Purpose: Define the structured schema for non-fatal stderr notices.
//! Exports: `Notice`, `notice_json`.
//! Role: Shared contract for CLI side-channel diagnostics.
//! Invariants: Notices never touch stdout; command payloads stay unmixed.
//! Invariants: The published field set only grows; existing fields keep meaning.
use serde_json::{Map, Value, json};

/// Non-fatal event surfaced on stderr alongside normal command output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub time: String,
    pub cmd: String,
    pub message: String,
    pub details: Map<String, Value>,
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut body = Map::new();
    body.insert("kind".to_string(), json!(notice.kind));
    body.insert("time".to_string(), json!(notice.time));
    body.insert("cmd".to_string(), json!(notice.cmd));
    body.insert("message".to_string(), json!(notice.message));
    body.insert("details".to_string(), Value::Object(notice.details.clone()));
    json!({ "notice": body })
}

#[cfg(test)]
mod tests {
    use super::{Notice, notice_json};
    use serde_json::{Map, json};

    #[test]
    fn notice_json_has_required_fields() {
        let details = Map::from_iter([("ignored".to_string(), json!(["price", "sku"]))]);
        let notice = Notice {
            kind: "ignored_fields".to_string(),
            time: "2026-02-01T00:00:00Z".to_string(),
            cmd: "add".to_string(),
            message: "Ignored extra fields from model output: price, sku.".to_string(),
            details,
        };
        let value = notice_json(&notice);
        let body = &value["notice"];
        assert_eq!(body["kind"], "ignored_fields");
        assert_eq!(body["time"], "2026-02-01T00:00:00Z");
        assert_eq!(body["cmd"], "add");
        assert_eq!(
            body["message"],
            "Ignored extra fields from model output: price, sku."
        );
        assert_eq!(body["details"]["ignored"], json!(["price", "sku"]));
    }
}

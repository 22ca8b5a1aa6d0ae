//! Worker message envelopes (spec.md §6): a flat `{type, id, ...}` schema
//! rather than JSON-RPC's `{jsonrpc, method, params, id}`. Grounded on
//! `keel-server/src/mcp.rs`'s request/response split, adapted to the
//! flatter shape this interface specifies.

use serde_json::Value;

/// Exit code on graceful shutdown.
pub const EXIT_OK: i32 = 0;
/// Exit code on memory-ceiling breach (spec.md §5, §6).
pub const EXIT_MEMORY_CEILING: i32 = 137;
/// Exit code on fatal initialization failure (spec.md §6).
pub const EXIT_FATAL_INIT: i32 = 1;

/// The `id` system-originated errors carry (spec.md §6).
pub const SYSTEM_ID: &str = "system";

/// A parsed request: its `type`, its `id` (echoed back verbatim), and the
/// raw body for handlers to pull their own fields out of.
pub struct Request {
    pub kind: String,
    pub id: Value,
    pub body: Value,
}

/// Parses one stdin line into a [`Request`]. Unlike JSON-RPC's
/// method/params split, every field (including `type` and `id`) lives
/// directly on the body object.
pub fn parse_request(line: &str) -> Result<Request, String> {
    let body: Value = serde_json::from_str(line).map_err(|e| format!("malformed request: {e}"))?;
    let kind = body
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| "missing 'type' field".to_string())?
        .to_string();
    let id = body.get("id").cloned().unwrap_or(Value::Null);
    Ok(Request { kind, id, body })
}

/// Builds a successful response: the echoed `id` plus the response's own
/// `type` tag and payload fields merged in.
pub fn ok_response(id: Value, response_type: &str, payload: Value) -> Value {
    let mut merged = match payload {
        Value::Object(map) => map,
        other => {
            let mut map = serde_json::Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    merged.insert("type".to_string(), Value::String(response_type.to_string()));
    merged.insert("id".to_string(), id);
    Value::Object(merged)
}

/// A transient-input or data-class `error` response (spec.md §7): the
/// worker stays up.
pub fn error_response(id: Value, error: impl std::fmt::Display) -> Value {
    serde_json::json!({
        "type": "error",
        "id": id,
        "error": error.to_string(),
    })
}

/// A resource-class `system` error (spec.md §7): terminal, always carries
/// the literal `"system"` id regardless of the request that triggered it.
pub fn system_error(error: impl std::fmt::Display) -> Value {
    serde_json::json!({
        "type": "error",
        "id": SYSTEM_ID,
        "error": error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request_extracts_type_and_id() {
        let req = parse_request(r#"{"type":"stats","id":"42"}"#).unwrap();
        assert_eq!(req.kind, "stats");
        assert_eq!(req.id, Value::String("42".to_string()));
    }

    #[test]
    fn test_parse_request_missing_type_is_error() {
        assert!(parse_request(r#"{"id":"1"}"#).is_err());
    }

    #[test]
    fn test_parse_request_malformed_json_is_error() {
        assert!(parse_request("{not json").is_err());
    }

    #[test]
    fn test_ok_response_merges_payload_and_tags_type_and_id() {
        let response = ok_response(
            Value::String("7".to_string()),
            "stats-result",
            serde_json::json!({"symbolCount": 3}),
        );
        assert_eq!(response["type"], "stats-result");
        assert_eq!(response["id"], "7");
        assert_eq!(response["symbolCount"], 3);
    }

    #[test]
    fn test_system_error_always_uses_system_id() {
        let response = system_error("out of memory");
        assert_eq!(response["id"], SYSTEM_ID);
        assert_eq!(response["type"], "error");
    }
}

//! Line framing for the realtime stream.

use serde_json::{Map, Value};

/// Prefix that marks a line carrying a JSON frame.
pub const DATA_PREFIX: &str = "data:";

/// Key wrapping the payload inside every realtime frame.
pub const DECORATED_EVENT_KEY: &str = "com.linkedin.realtimefrontend.DecoratedEvent";
pub const PAYLOAD_KEY: &str = "payload";

/// Parse one line of the stream.
///
/// Returns `None` for lines that are not data lines (comments, `event:`,
/// `id:` and blank keep-alive lines). Otherwise strips the `data:` prefix and
/// at most one following space, then parses the rest as JSON.
pub fn parse_frame(line: &str) -> Option<Result<Value, serde_json::Error>> {
    let data = line.strip_prefix(DATA_PREFIX)?;
    let data = data.strip_prefix(' ').unwrap_or(data);
    Some(serde_json::from_str(data))
}

/// The payload object of a frame, or an empty object when the frame has no
/// `DecoratedEvent` wrapper.
pub fn extract_payload(frame: &Value) -> Value {
    frame
        .get(DECORATED_EVENT_KEY)
        .and_then(|decorated| decorated.get(PAYLOAD_KEY))
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()))
}

/// Whether `key` is present and non-null in `payload`.
pub fn has_key(payload: &Value, key: &str) -> bool {
    payload.get(key).is_some_and(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_data_lines_are_ignored() {
        assert!(parse_frame("").is_none());
        assert!(parse_frame(":keep-alive").is_none());
        assert!(parse_frame("event: message").is_none());
        assert!(parse_frame("id: 42").is_none());
    }

    #[test]
    fn strips_prefix_and_a_single_space() {
        let frame = parse_frame(r#"data: {"a":1}"#).unwrap().unwrap();
        assert_eq!(frame, json!({ "a": 1 }));

        let frame = parse_frame(r#"data:{"a":2}"#).unwrap().unwrap();
        assert_eq!(frame, json!({ "a": 2 }));

        // Any further whitespace is left to the JSON parser, which accepts it.
        let frame = parse_frame("data:   [1]").unwrap().unwrap();
        assert_eq!(frame, json!([1]));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_frame("data: {not json").unwrap().is_err());
        assert!(parse_frame("data:").unwrap().is_err());
    }

    #[test]
    fn extracts_wrapped_payload() {
        let frame = json!({
            "com.linkedin.realtimefrontend.DecoratedEvent": {
                "topic": "urn:li-realtime:messagesTopic:urn:li-realtime:myself",
                "payload": { "event": { "subtype": "MEMBER_TO_MEMBER" } }
            }
        });
        let payload = extract_payload(&frame);
        assert!(has_key(&payload, "event"));
        assert!(!has_key(&payload, "reactionAdded"));
    }

    #[test]
    fn missing_wrapper_yields_empty_object() {
        assert_eq!(extract_payload(&json!({ "heartbeat": true })), json!({}));
        assert_eq!(
            extract_payload(&json!({ DECORATED_EVENT_KEY: { "topic": "t" } })),
            json!({})
        );
    }

    #[test]
    fn null_keys_count_as_absent() {
        let payload = json!({ "reactionAdded": null, "event": {} });
        assert!(!has_key(&payload, "reactionAdded"));
        assert!(has_key(&payload, "event"));
    }
}

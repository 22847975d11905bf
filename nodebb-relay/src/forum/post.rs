//! Mapping from a GitHub delivery to a NodeBB topic.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer, Value};

/// Label placed between the date and the sender in topic titles.
pub const TITLE_LABEL: &str = "개발 일지";

/// Login used when the payload carries no `sender.login`.
pub const UNKNOWN_SENDER: &str = "unknown";

/// Body of `POST /api/v3/topics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForumPost {
    /// Category the topic is created in
    pub cid: String,
    pub title: String,
    pub content: String,
}

impl ForumPost {
    /// Build the topic for a delivery received at `now`.
    pub fn from_payload(cid: &str, payload: &Value, now: DateTime<Local>) -> Self {
        let login = sender_login(payload);

        let title = format!("{} {} - {}", now.format("%Y-%m-%d"), TITLE_LABEL, login);

        let submitted_at = now
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        let content = format!(
            "담당: {}\n시간: {}\n\n```\n{}\n```",
            login,
            submitted_at,
            pretty_payload(payload)
        );

        ForumPost {
            cid: cid.to_string(),
            title,
            content,
        }
    }
}

/// Extract `sender.login`, or [`UNKNOWN_SENDER`] when absent.
pub fn sender_login(payload: &Value) -> &str {
    payload
        .get("sender")
        .and_then(|sender| sender.get("login"))
        .and_then(Value::as_str)
        .filter(|login| !login.is_empty())
        .unwrap_or(UNKNOWN_SENDER)
}

/// Render the payload with four-space indentation, keeping key order.
fn pretty_payload(payload: &Value) -> String {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));

    if payload.serialize(&mut ser).is_err() {
        return payload.to_string();
    }

    String::from_utf8(buf).unwrap_or_else(|_| payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Local> {
        let utc = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        utc.with_timezone(&Local)
    }

    #[test]
    fn test_sender_login() {
        assert_eq!(sender_login(&json!({"sender": {"login": "alice"}})), "alice");
        assert_eq!(sender_login(&json!({"sender": {}})), UNKNOWN_SENDER);
        assert_eq!(sender_login(&json!({"sender": {"login": 42}})), UNKNOWN_SENDER);
        assert_eq!(sender_login(&json!({"sender": {"login": ""}})), UNKNOWN_SENDER);
        assert_eq!(sender_login(&json!({})), UNKNOWN_SENDER);
        assert_eq!(sender_login(&json!([1, 2, 3])), UNKNOWN_SENDER);
    }

    #[test]
    fn test_title_contains_date_and_sender() {
        let now = fixed_now();
        let post = ForumPost::from_payload("7", &json!({"sender": {"login": "alice"}}), now);

        let expected = format!("{} 개발 일지 - alice", now.format("%Y-%m-%d"));
        assert_eq!(post.title, expected);
        assert_eq!(post.cid, "7");
    }

    #[test]
    fn test_content_layout() {
        let payload = json!({"zeta": 1, "sender": {"login": "bob"}});
        let post = ForumPost::from_payload("-1", &payload, fixed_now());

        let expected = "담당: bob\n시간: 2024-03-05T12:00:00.000Z\n\n```\n{\n    \"zeta\": 1,\n    \"sender\": {\n        \"login\": \"bob\"\n    }\n}\n```";
        assert_eq!(post.content, expected);
    }

    #[test]
    fn test_serializes_as_topic_request() {
        let post = ForumPost::from_payload("3", &json!({}), fixed_now());
        let body = serde_json::to_value(&post).unwrap();

        assert_eq!(body["cid"], "3");
        assert!(body["title"].as_str().unwrap().ends_with("- unknown"));
        assert!(body["content"].as_str().unwrap().ends_with("```\n{}\n```"));
    }
}

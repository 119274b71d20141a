use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChatError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct HealthReply {
    message: String,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST the message to `/chat` and return the `response` field.
    ///
    /// The status code is not checked: whatever JSON the server sends back is
    /// read the same way.
    pub async fn send(&self, message: &str) -> Result<String, ChatError> {
        let url = format!("{}/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(%status, bytes = body.len(), "chat reply received");

        let value: Value = serde_json::from_slice(&body)?;
        reply_text(value)
    }

    /// Probe `GET /`, which answers with a short status message.
    pub async fn health(&self) -> Result<String, ChatError> {
        let url = format!("{}/", self.base_url);

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        let reply: HealthReply = serde_json::from_slice(&body)?;
        Ok(reply.message)
    }
}

/// Pull the displayable text out of a parsed reply body.
///
/// A missing or null `response` reads as empty. Only a bare `null` body is an
/// error, since there is no object to read a field from.
pub fn reply_text(value: Value) -> Result<String, ChatError> {
    match value {
        Value::Null => Err(ChatError::EmptyBody),
        Value::Object(mut map) => Ok(map
            .remove("response")
            .map(display_value)
            .unwrap_or_default()),
        _ => Ok(String::new()),
    }
}

/// Text a field value shows as: booleans and null show nothing, numbers in
/// their shortest form, arrays as their items run together. Objects have no
/// natural text, so they show as JSON.
fn display_value(value: Value) -> String {
    match value {
        Value::Null | Value::Bool(_) => String::new(),
        Value::String(text) => text,
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        Value::Array(items) => items.into_iter().map(display_value).collect(),
        object @ Value::Object(_) => object.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{unreachable_endpoint, StubBackend};
    use serde_json::json;

    #[test]
    fn test_reply_text_string() {
        let text = reply_text(json!({"response": "hello"})).unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_reply_text_missing_field_is_empty() {
        let text = reply_text(json!({"detail": "boom"})).unwrap();
        assert_eq!(text, "");
        let text = reply_text(json!({"response": null})).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_reply_text_non_string_value() {
        assert_eq!(reply_text(json!({"response": 42})).unwrap(), "42");
        assert_eq!(reply_text(json!({"response": 2.0})).unwrap(), "2");
        assert_eq!(reply_text(json!({"response": 0.5})).unwrap(), "0.5");
        assert_eq!(reply_text(json!({"response": true})).unwrap(), "");
        assert_eq!(reply_text(json!({"response": false})).unwrap(), "");
        assert_eq!(reply_text(json!({"response": [1, 2]})).unwrap(), "12");
        assert_eq!(
            reply_text(json!({"response": ["a", null, true, ["b", 3]]})).unwrap(),
            "ab3"
        );
        assert_eq!(
            reply_text(json!({"response": {"k": 1}})).unwrap(),
            r#"{"k":1}"#
        );
    }

    #[test]
    fn test_reply_text_non_object_body() {
        assert_eq!(reply_text(json!("plain")).unwrap(), "");
        assert_eq!(reply_text(json!([1, 2, 3])).unwrap(), "");
    }

    #[test]
    fn test_reply_text_null_body_is_error() {
        assert!(matches!(reply_text(Value::Null), Err(ChatError::EmptyBody)));
    }

    #[test]
    fn test_new_strips_trailing_slash() {
        let client = ChatClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_send_posts_message_as_json() {
        let backend = StubBackend::reply(200, r#"{"response":"Hello!"}"#).await;
        let client = ChatClient::new(&backend.url);

        let reply = client.send("hi").await.unwrap();

        assert_eq!(reply, "Hello!");
        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/chat");
        assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
        assert_eq!(requests[0].body, json!({"message": "hi"}));
    }

    #[tokio::test]
    async fn test_send_ignores_status_code() {
        let backend = StubBackend::reply(500, r#"{"response":"still read"}"#).await;
        let client = ChatClient::new(&backend.url);

        assert_eq!(client.send("x").await.unwrap(), "still read");
    }

    #[tokio::test]
    async fn test_send_rejects_non_json_body() {
        let backend = StubBackend::reply(200, "Internal Server Error").await;
        let client = ChatClient::new(&backend.url);

        let err = client.send("x").await.unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[tokio::test]
    async fn test_send_unreachable_is_transport_error() {
        let client = ChatClient::new(&unreachable_endpoint().await);

        let err = client.send("x").await.unwrap_err();
        assert_eq!(err.kind(), "transport");
    }

    #[tokio::test]
    async fn test_health_reads_message() {
        let backend = StubBackend::reply(200, r#"{"message":"Weather API is running"}"#).await;
        let client = ChatClient::new(&backend.url);

        assert_eq!(client.health().await.unwrap(), "Weather API is running");
        assert_eq!(backend.requests()[0].path, "/");
    }

    #[tokio::test]
    async fn test_health_fails_on_error_status() {
        let backend = StubBackend::reply(503, r#"{"message":"down"}"#).await;
        let client = ChatClient::new(&backend.url);

        assert!(client.health().await.is_err());
    }
}

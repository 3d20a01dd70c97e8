//! Call boundary to the hosted model service.
//!
//! Every request carries the fixed system instruction and the latest user
//! message only. Earlier turns in the transcript are never forwarded.

use std::error::Error;
use std::fmt;

use async_trait::async_trait;

use crate::api::ChatMessage;

pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful AI assistant. Answer the user's questions clearly and concisely.";

/// Sends one user message upstream and returns the reply text.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    async fn ask(&self, user_text: &str) -> Result<String, UpstreamError>;
}

/// The two-message payload sent for a single turn.
pub fn build_messages(user_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_INSTRUCTION),
        ChatMessage::user(user_text),
    ]
}

/// Failures talking to the model service. Each one ends the current turn only.
#[derive(Debug)]
pub enum UpstreamError {
    /// The request never completed (DNS, TLS, connection reset, body read).
    Transport(reqwest::Error),

    /// The service answered with a non-success status.
    Status { status: u16, message: String },

    /// A success status whose body was not a chat completion.
    Decode(serde_json::Error),

    /// A chat completion without any reply text.
    EmptyReply,
}

impl UpstreamError {
    /// Builds a status error, pulling the human-readable message out of a
    /// JSON error body when there is one.
    pub fn from_status(status: u16, body: &str) -> Self {
        UpstreamError::Status {
            status,
            message: summarize_error_body(body),
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Transport(err) => {
                write!(f, "Could not reach the model service: {err}")
            }
            UpstreamError::Status { status, message } => {
                write!(f, "Model service returned HTTP {status}: {message}")
            }
            UpstreamError::Decode(err) => {
                write!(f, "Could not decode the model service reply: {err}")
            }
            UpstreamError::EmptyReply => write!(f, "The model service returned an empty reply"),
        }
    }
}

impl Error for UpstreamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            UpstreamError::Transport(err) => Some(err),
            UpstreamError::Decode(err) => Some(err),
            UpstreamError::Status { .. } | UpstreamError::EmptyReply => None,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Transport(err)
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(err: serde_json::Error) -> Self {
        UpstreamError::Decode(err)
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One-line description of an error body, preferring `error.message`.
pub fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty response body>".to_string();
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json) {
            let summary = collapse_whitespace(&summary);
            if !summary.is_empty() {
                return summary;
            }
        }
    }

    collapse_whitespace(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_messages_has_system_then_user() {
        let messages = build_messages("What is Rust?");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, SYSTEM_INSTRUCTION);
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "What is Rust?");
    }

    #[test]
    fn summary_prefers_nested_error_message() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#;
        assert_eq!(summarize_error_body(body), "Invalid API Key");
    }

    #[test]
    fn summary_accepts_string_error_field() {
        assert_eq!(
            summarize_error_body(r#"{"error":"rate   limited"}"#),
            "rate limited"
        );
    }

    #[test]
    fn summary_falls_back_to_raw_text() {
        assert_eq!(
            summarize_error_body("  Bad Gateway\n upstream down "),
            "Bad Gateway upstream down"
        );
        assert_eq!(summarize_error_body("   "), "<empty response body>");
    }

    #[test]
    fn status_error_display_includes_code_and_summary() {
        let err = UpstreamError::from_status(401, r#"{"error":{"message":"Invalid API Key"}}"#);
        assert_eq!(
            err.to_string(),
            "Model service returned HTTP 401: Invalid API Key"
        );
        assert!(err.source().is_none());
    }
}

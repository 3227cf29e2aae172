//! # Chat Backend Handlers
//!
//! File: cli/src/commands/serve/handlers.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! - `POST /api/chat` validates the body, then hands the message to the
//!   `ResponseRouter` under the configured deadline.
//! - `GET /health` and `GET /` return fixed payloads.
//! - `not_found` answers every unknown path or method.
//!
//! Validation runs entirely here; the router only ever sees a non-blank
//! message of at most `MAX_MESSAGE_CHARS` UTF-16 code units, the length a
//! browser reports for the same text.
//!
use super::api_error::{ApiError, INVALID_MESSAGE, MESSAGE_TOO_LONG};
use crate::common::api::{ChatRequest, ChatResponse, MAX_MESSAGE_CHARS};
use crate::core::error::ProviderError;
use crate::core::router::ResponseRouter;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ResponseRouter>,
    /// Deadline for one `route` call.
    pub request_timeout: Duration,
}

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Voice Chatbot API is running!" }))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Fallback for unknown paths and methods.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// `POST /api/chat`
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let request = validate_chat_request(payload)?;

    let reply = tokio::time::timeout(state.request_timeout, state.router.route(&request.message))
        .await
        .map_err(|_| {
            ProviderError::Unavailable(format!(
                "no reply within {}s",
                state.request_timeout.as_secs()
            ))
        })??;

    info!(source = ?reply.source, "Answered chat message");
    Ok(Json(ChatResponse {
        response: reply.text,
    }))
}

/// Whitespace as a browser's `trim()` sees it, which includes the BOM.
fn is_blank(message: &str) -> bool {
    message
        .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .is_empty()
}

/// Accepts a body only if `message` is a non-blank string of at most
/// `MAX_MESSAGE_CHARS` UTF-16 code units.
pub fn validate_chat_request(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ChatRequest, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        debug!("Rejected chat body: {}", rejection.body_text());
        ApiError::Validation(INVALID_MESSAGE)
    })?;

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !is_blank(m))
        .ok_or(ApiError::Validation(INVALID_MESSAGE))?;

    if message.encode_utf16().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::Validation(MESSAGE_TOO_LONG));
    }

    Ok(ChatRequest {
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(body: Value) -> Result<ChatRequest, ApiError> {
        validate_chat_request(Ok(Json(body)))
    }

    fn rejected_with(result: Result<ChatRequest, ApiError>) -> &'static str {
        match result {
            Err(ApiError::Validation(message)) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_message_untrimmed() {
        let request = validate(json!({ "message": "  Hello there  " })).unwrap();
        assert_eq!(request.message, "  Hello there  ");
    }

    #[test]
    fn test_rejects_missing_blank_or_non_string() {
        for body in [
            json!({}),
            json!({ "message": "" }),
            json!({ "message": " \n\t " }),
            json!({ "message": 42 }),
            json!({ "message": null }),
            json!({ "message": ["hi"] }),
            json!("hi"),
        ] {
            assert_eq!(rejected_with(validate(body)), INVALID_MESSAGE);
        }
    }

    #[test]
    fn test_length_limit_counts_utf16_units() {
        assert!(validate(json!({ "message": "a".repeat(500) })).is_ok());
        assert_eq!(
            rejected_with(validate(json!({ "message": "a".repeat(501) }))),
            MESSAGE_TOO_LONG
        );
        // "é" is one unit, so 500 of them fit.
        assert!(validate(json!({ "message": "é".repeat(500) })).is_ok());
        // Astral characters take two units each.
        assert!(validate(json!({ "message": "😀".repeat(250) })).is_ok());
        assert_eq!(
            rejected_with(validate(json!({ "message": "😀".repeat(300) }))),
            MESSAGE_TOO_LONG
        );
    }

    #[test]
    fn test_bom_only_message_is_blank() {
        for message in ["\u{feff}", " \u{feff}\n", "\u{feff}\u{a0}"] {
            assert_eq!(
                rejected_with(validate(json!({ "message": message }))),
                INVALID_MESSAGE
            );
        }
        assert!(validate(json!({ "message": "\u{feff}hi" })).is_ok());
    }
}

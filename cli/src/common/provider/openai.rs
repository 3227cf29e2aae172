//! # OpenAI-Compatible Completion Provider
//!
//! File: cli/src/common/provider/openai.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Sends a two-message chat (system + user) to `{base_url}/chat/completions`
//! and returns `choices[0].message.content` unchanged.
//!
//! Status mapping:
//! - `401` → `ProviderError::Auth`
//! - `429` → `ProviderError::RateLimited`
//! - anything else that is not `2xx`, transport errors, and unusable bodies
//!   → `ProviderError::Unavailable`
//!
//! Only a connect timeout is configured here. The overall deadline belongs to
//! the caller, which wraps the call in `tokio::time::timeout`.
//!
use super::{CompletionProvider, CompletionRequest};
use crate::core::error::{ProviderError, Result};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default API root for the hosted service.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Longest slice of an error body kept in `Unavailable` details.
const MAX_ERROR_DETAIL: usize = 200;

/// Connection settings for `OpenAiProvider`.
#[derive(Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub connect_timeout: Duration,
}

// Hand-written so the API key never lands in logs.
impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for any endpoint speaking the OpenAI chat-completions protocol.
pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
    settings: ProviderSettings,
}

impl OpenAiProvider {
    /// Builds the provider and its HTTP client.
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .context("Failed to build HTTP client for the completion provider")?;
        let endpoint = format!(
            "{}/chat/completions",
            settings.base_url.trim_end_matches('/')
        );
        debug!("Completion provider endpoint: {}", endpoint);
        Ok(Self {
            client,
            endpoint,
            settings,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest) -> std::result::Result<String, ProviderError> {
        let body = ChatCompletionBody {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_message,
                },
            ],
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("Completion request failed to send: {}", e);
                ProviderError::Unavailable(format!("request failed: {e}"))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(classify_failure(status, &text));
        }
        parse_completion(&text)
    }
}

/// Maps a non-success status to the provider error taxonomy.
fn classify_failure(status: StatusCode, body: &str) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED => ProviderError::Auth,
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
        _ => {
            let detail: String = body.chars().take(MAX_ERROR_DETAIL).collect();
            ProviderError::Unavailable(format!("HTTP {status}: {detail}"))
        }
    }
}

/// Pulls the first choice's text out of a successful response body.
fn parse_completion(body: &str) -> std::result::Result<String, ProviderError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Unavailable(format!("malformed completion body: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::Unavailable("completion contained no text".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    /// Serves `app` on an ephemeral localhost port.
    async fn spawn(app: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn provider_for(addr: SocketAddr) -> OpenAiProvider {
        OpenAiProvider::new(ProviderSettings {
            base_url: format!("http://{addr}/v1/"),
            api_key: "sk-test".into(),
            model: "test-model".into(),
            connect_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn request(message: &str) -> CompletionRequest {
        CompletionRequest {
            system_prompt: "be nice".into(),
            user_message: message.into(),
            max_tokens: 150,
        }
    }

    #[tokio::test]
    async fn test_complete_sends_expected_body_and_returns_content() {
        let captured: Captured = Arc::default();
        let app = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    |State(seen): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        seen.lock().unwrap().push((auth, body));
                        Json(json!({
                            "choices": [{ "message": { "role": "assistant", "content": "  Hi there!\n" } }]
                        }))
                    },
                ),
            )
            .with_state(captured.clone());
        let addr = spawn(app).await;

        let provider = provider_for(addr);
        assert!(provider.endpoint().ends_with("/v1/chat/completions"));

        let text = provider.complete(request("Hello THERE")).await.unwrap();
        assert_eq!(text, "  Hi there!\n");

        let seen = captured.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (auth, body) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["max_tokens"], 150);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be nice");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Hello THERE");
    }

    #[tokio::test]
    async fn test_complete_maps_unauthorized_to_auth() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    axum::http::StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": { "message": "bad key" } })),
                )
            }),
        );
        let addr = spawn(app).await;

        let err = provider_for(addr).complete(request("hi")).await.unwrap_err();
        assert_eq!(err, ProviderError::Auth);
    }

    #[tokio::test]
    async fn test_complete_connection_refused_is_unavailable() {
        // Bind then drop to get a port that is very likely closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = provider_for(addr).complete(request("hi")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[test]
    fn test_classify_failure() {
        assert_eq!(
            classify_failure(StatusCode::UNAUTHORIZED, ""),
            ProviderError::Auth
        );
        assert_eq!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, "slow"),
            ProviderError::RateLimited
        );
        match classify_failure(StatusCode::BAD_GATEWAY, &"x".repeat(1000)) {
            ProviderError::Unavailable(detail) => {
                assert!(detail.starts_with("HTTP 502"));
                assert!(detail.len() < 300);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_completion_edge_cases() {
        assert!(matches!(
            parse_completion("not json"),
            Err(ProviderError::Unavailable(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(ProviderError::Unavailable(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(ProviderError::Unavailable(_))
        ));
        assert_eq!(
            parse_completion(r#"{"choices":[{"message":{"content":"ok"}},{"message":{"content":"no"}}]}"#),
            Ok("ok".to_string())
        );
    }

    #[test]
    fn test_settings_debug_redacts_key() {
        let settings = ProviderSettings {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: "sk-secret".into(),
            model: DEFAULT_MODEL.into(),
            connect_timeout: Duration::from_secs(1),
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}

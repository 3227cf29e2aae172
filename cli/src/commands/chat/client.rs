//! # Chat Backend Client
//!
//! File: cli/src/commands/chat/client.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `ChatClient` posts one message to `{api_url}/api/chat` and returns the
//! reply text. A non-success status becomes `ChatError::Api` carrying the
//! server's `error` text; transport failures become `ChatError::Client`.
//!
use crate::common::api::{ChatRequest, ChatResponse, ErrorBody, CHAT_PATH};
use crate::core::error::{ChatError, Result};
use anyhow::{anyhow, Context};
use std::time::Duration;
use tracing::{debug, warn};

/// Shown when the server fails without a usable `error` field.
pub const GENERIC_FAILURE: &str = "Something went wrong with the response";

/// Upper bound for one round trip. The server gives up on its side first.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for the chat backend.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    /// Creates a client for the backend at `api_url` (e.g. `http://localhost:3003`).
    pub fn new(api_url: &str) -> Result<Self> {
        let base = api_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(anyhow!(ChatError::Config("API URL must not be empty".into())));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint: format!("{base}{CHAT_PATH}"),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends `message` and returns the bot's reply.
    pub async fn send(&self, message: &str) -> Result<String> {
        debug!("POST {} ({} chars)", self.endpoint, message.chars().count());
        let response = self
            .http
            .post(&self.endpoint)
            .json(&ChatRequest {
                message: message.to_string(),
            })
            .send()
            .await
            .map_err(|e| {
                anyhow!(ChatError::Client(format!(
                    "could not reach {}: {e}",
                    self.endpoint
                )))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .map(|body| body.error)
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            warn!("Chat backend answered {}: {}", status, message);
            return Err(anyhow!(ChatError::Api {
                status: status.as_u16(),
                message,
            }));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| anyhow!(ChatError::Client(format!("unreadable reply: {e}"))))?;
        Ok(body.response)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::commands::serve::api_error::{INVALID_MESSAGE, PROVIDER_AUTH};
    use crate::commands::serve::config::sample_settings;
    use crate::commands::serve::server_logic::create_app;
    use crate::common::provider::CompletionProvider;
    use crate::core::error::ProviderError;
    use crate::core::router::tests::ScriptedProvider;
    use crate::core::router::ResponseRouter;
    use crate::core::rules::builtin_rules;
    use axum::http::StatusCode;
    use axum::Router;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    async fn serve_on_ephemeral_port(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });
        format!("http://{addr}")
    }

    /// Runs the real backend with `provider` and returns its base URL.
    pub(crate) async fn spawn_backend(provider: Arc<dyn CompletionProvider>) -> String {
        let settings = sample_settings();
        let router = Arc::new(ResponseRouter::new(
            settings.rules.clone(),
            provider,
            settings.router.clone(),
        ));
        serve_on_ephemeral_port(create_app(&settings, router).unwrap()).await
    }

    fn api_error(err: &anyhow::Error) -> (u16, String) {
        match err.downcast_ref::<ChatError>() {
            Some(ChatError::Api { status, message }) => (*status, message.clone()),
            other => panic!("expected ChatError::Api, got {other:?}"),
        }
    }

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let client = ChatClient::new("http://localhost:3003/").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3003/api/chat");
        assert!(ChatClient::new("   ").is_err());
    }

    #[tokio::test]
    async fn test_send_returns_keyword_reply() {
        let provider = ScriptedProvider::replying("unused");
        let url = spawn_backend(provider.clone()).await;

        let reply = ChatClient::new(&url)
            .unwrap()
            .send("What's your superpower?")
            .await
            .unwrap();

        assert_eq!(reply, builtin_rules()[1].answer);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_send_returns_completion_reply() {
        let url = spawn_backend(ScriptedProvider::replying("Paris, of course.")).await;
        let reply = ChatClient::new(&url)
            .unwrap()
            .send("What is the capital of France?")
            .await
            .unwrap();
        assert_eq!(reply, "Paris, of course.");
    }

    #[tokio::test]
    async fn test_server_errors_carry_server_message() {
        let url = spawn_backend(ScriptedProvider::failing(ProviderError::Auth)).await;
        let client = ChatClient::new(&url).unwrap();

        let err = client.send("Tell me a joke").await.unwrap_err();
        assert_eq!(api_error(&err), (401, PROVIDER_AUTH.to_string()));

        let err = client.send("   ").await.unwrap_err();
        assert_eq!(api_error(&err), (400, INVALID_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn test_error_without_body_uses_generic_message() {
        let app = Router::new().route(
            CHAT_PATH,
            axum::routing::post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let url = serve_on_ephemeral_port(app).await;

        let err = ChatClient::new(&url).unwrap().send("hi").await.unwrap_err();
        assert_eq!(api_error(&err), (502, GENERIC_FAILURE.to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_client_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = ChatClient::new(&format!("http://{addr}"))
            .unwrap()
            .send("hi")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatError>(),
            Some(ChatError::Client(_))
        ));
    }
}

//! # VoiceChat HTTP Server Implementation
//!
//! File: cli/src/commands/serve/server_logic.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Builds the Axum application for the chat backend and runs it until a
//! shutdown signal arrives. The application consists of:
//! - Routes: `GET /`, `GET /health`, `POST /api/chat`, and a JSON 404 for
//!   every other path or method
//! - Middleware (outermost first): request tracing, CORS, per-client rate limit
//!
//! ## Examples
//!
//! ```rust
//! let settings = config::load_settings(args)?;
//! server_logic::run_server(settings).await?;
//! ```
//!
use super::config::ServerSettings;
use super::handlers::{self, AppState};
use super::rate_limit::{self, RateLimiter};
use crate::common::api::CHAT_PATH;
use crate::common::provider::OpenAiProvider;
use crate::core::error::Result;
use crate::core::router::ResponseRouter;
use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

/// # Run HTTP Server (`run_server`)
///
/// Wires the OpenAI provider into a `ResponseRouter`, builds the app, binds
/// the listener and serves until Ctrl+C or SIGTERM.
///
/// ## Errors
///
/// Returns an error if the provider client cannot be built, an allowed origin
/// is invalid, the address cannot be bound, or the server fails.
pub async fn run_server(settings: ServerSettings) -> Result<()> {
    let provider = OpenAiProvider::new(settings.provider.clone())?;
    info!("Completion provider: {} ({})", provider.endpoint(), settings.provider.model);
    let router = Arc::new(ResponseRouter::new(
        settings.rules.clone(),
        Arc::new(provider),
        settings.router.clone(),
    ));

    let app = create_app(&settings, router)?;
    let addr = SocketAddr::new(settings.host, settings.port);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener to address {}", addr))?;
    let bound = listener.local_addr().context("Failed to read bound address")?;

    println!("\n=================================================================");
    println!("🎙️  VoiceChat API listening on http://{}", bound);
    println!("💬 Chat endpoint:     POST {}", CHAT_PATH);
    println!("🧠 Model:             {}", settings.provider.model);
    println!("📜 Keyword rules:     {}", settings.rules.len());
    println!("🔒 Allowed origins:   {}", settings.allowed_origins.join(", "));
    println!(
        "⏱️  Rate limit:        {} requests / {}s per client",
        settings.rate_limit.max_requests,
        settings.rate_limit.window.as_secs()
    );
    println!("=================================================================\n");
    info!("Server is up and running on {}", bound);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server failed")?;

    println!("\nServer shutdown complete.");
    Ok(())
}

/// # Handle Shutdown Signal (`shutdown_signal`)
///
/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown..."),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
            Err(e) => {
                error!(
                    "Failed to install SIGTERM handler: {}. Shutdown on SIGTERM might not work.",
                    e
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Builds the CORS policy from the allowed origin list.
fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid allowed origin '{}'", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

/// # Create Axum Application (`create_app`)
///
/// Constructs the router with all routes and middleware around the given
/// `ResponseRouter`.
pub fn create_app(settings: &ServerSettings, router: Arc<ResponseRouter>) -> Result<Router> {
    let state = AppState {
        router,
        request_timeout: settings.request_timeout,
    };
    let limiter = Arc::new(RateLimiter::new(settings.rate_limit));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::default().include_headers(false))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Ok(Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(CHAT_PATH, post(handlers::chat))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        .with_state(state)
        .layer(middleware::from_fn_with_state(limiter, rate_limit::enforce))
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(cors_layer(&settings.allowed_origins)?),
        ))
}

// --- Unit Tests ---

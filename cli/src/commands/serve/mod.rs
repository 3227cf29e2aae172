//! # VoiceChat Backend Server
//!
//! File: cli/src/commands/serve/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `voicechat serve` runs the chat backend. Incoming messages are answered
//! from the keyword rule table when possible and otherwise by the completion
//! provider. The server adds CORS, per-client rate limiting, request
//! validation, and fixed JSON error bodies.
//!
//! ## Architecture
//!
//! - `config.rs`: `ServeArgs` and the resolved `ServerSettings`
//! - `server_logic.rs`: Axum app assembly, listener, graceful shutdown
//! - `handlers.rs`: Route handlers and request validation
//! - `rate_limit.rs`: Fixed-window per-client limiter middleware
//! - `api_error.rs`: Error-to-response mapping
//!
//! ## Examples
//!
//! ```bash
//! # Serve on the default port 3003
//! OPENAI_API_KEY=sk-... voicechat serve
//!
//! # Custom port and front-end origin
//! voicechat serve --port 8080 --allowed-origin https://chat.example.com
//! ```
//!
use crate::core::error::Result;
use tracing::info;

pub use config::ServeArgs;

/// Error-to-response mapping for handlers and middleware.
pub mod api_error;

/// Command-line arguments and settings resolution.
pub mod config;

/// Route handlers and request validation.
pub mod handlers;

/// Per-client fixed-window rate limiting.
pub mod rate_limit;

/// Axum application assembly and the server loop.
pub mod server_logic;

/// # Handle Serve Command (`handle_serve`)
///
/// Resolves settings from flags, environment and config file, then runs the
/// server until shutdown.
///
/// ## Errors
///
/// Propagates configuration errors (including a missing API key) and server
/// startup failures.
pub async fn handle_serve(args: ServeArgs) -> Result<()> {
    info!("Handling serve command with args: {:?}", args);

    let settings = config::load_settings(args)?;
    info!(
        "Effective server settings: {}:{} with {} keyword rules",
        settings.host,
        settings.port,
        settings.rules.len()
    );

    server_logic::run_server(settings).await
}

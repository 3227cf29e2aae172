//! # VoiceChat Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module defines the error types shared across VoiceChat. Two enums
//! carry domain meaning:
//!
//! - `ProviderError`: the tagged failure a completion provider (and therefore
//!   the `ResponseRouter`) reports. Callers map each tag to a fixed
//!   user-facing message and HTTP status.
//! - `ChatError`: everything else the application can hit (validation,
//!   configuration, client-side API failures).
//!
//! Application flows return `Result<T>`, an alias for `anyhow::Result<T>`, so
//! context can be attached with `.context(...)` while the typed errors above
//! remain recoverable with `downcast_ref`.
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if api_key.trim().is_empty() {
//!     return Err(ChatError::Config("OPENAI_API_KEY is not set".into()))?;
//! }
//!
//! // Pattern matching on a provider failure
//! match router.route(message).await {
//!     Ok(reply) => println!("{}", reply.text),
//!     Err(ProviderError::RateLimited) => eprintln!("slow down"),
//!     Err(e) => return Err(e.into()),
//! }
//! ```
//!
use thiserror::Error;

/// Failure reported by a completion provider.
///
/// The three tags are deliberately coarse: they are exactly the categories the
/// HTTP layer distinguishes. Any detail worth logging travels in
/// `Unavailable`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider rejected the credentials (HTTP 401).
    #[error("Completion provider rejected the API key")]
    Auth,

    /// The provider is throttling us (HTTP 429).
    #[error("Completion provider rate limit exceeded")]
    RateLimited,

    /// Network failure, timeout, unexpected status, or an unusable body.
    #[error("Completion provider unavailable: {0}")]
    Unavailable(String),
}

/// Custom error type for the VoiceChat application.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A non-success response from the chat backend, as seen by the client.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error("Chat client error: {0}")]
    Client(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_err = ChatError::Config("OPENAI_API_KEY is not set".to_string());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: OPENAI_API_KEY is not set"
        );

        let api_err = ChatError::Api {
            status: 429,
            message: "Slow down! Too many requests at once".into(),
        };
        assert_eq!(
            api_err.to_string(),
            "Slow down! Too many requests at once (HTTP 429)"
        );
    }

    #[test]
    fn test_provider_tags_are_distinct() {
        assert_ne!(ProviderError::Auth, ProviderError::RateLimited);
        assert_ne!(
            ProviderError::RateLimited,
            ProviderError::Unavailable("timeout".into())
        );
    }
}

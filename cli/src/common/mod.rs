//! # VoiceChat Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared pieces used by more than one command:
//!
//! - **`api`**: JSON request/response shapes of the chat endpoint, used by
//!   the backend handlers and the terminal client alike.
//! - **`provider`**: The `CompletionProvider` capability and its
//!   OpenAI-compatible implementation.
//!
//! Command-specific logic lives under `commands::`, core infrastructure under
//! `core::`.
//!

/// Wire types for `POST /api/chat`.
pub mod api;
/// External text-completion providers.
pub mod provider;

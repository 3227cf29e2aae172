//! # VoiceChat Completion Providers (`common::provider`)
//!
//! File: cli/src/common/provider/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A completion provider turns one system instruction plus one user message
//! into free-form text. The `ResponseRouter` only talks to the
//! `CompletionProvider` trait, so the backend can run against the real
//! OpenAI-compatible API (`openai::OpenAiProvider`) or a stand-in during tests.
//!
//! Providers report failures as a tagged `ProviderError`; they never retry
//! and never substitute text on failure.
//!
use crate::core::error::ProviderError;
use async_trait::async_trait;

/// OpenAI-compatible chat-completions client.
pub mod openai;

pub use openai::{OpenAiProvider, ProviderSettings};

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Fixed instruction sent as the system turn.
    pub system_prompt: String,
    /// The user's original, un-normalized message.
    pub user_message: String,
    /// Upper bound on the generated length.
    pub max_tokens: u32,
}

/// The external text-completion capability.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Produces a completion for `request`, returning the text verbatim.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;
}

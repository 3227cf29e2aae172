//! # Response Router
//!
//! File: cli/src/core/router.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `ResponseRouter` decides how a chat message gets answered:
//!
//! 1. Lowercase the message once.
//! 2. Walk the rule table in order; the first rule with a keyword contained in
//!    the message wins and its answer is returned verbatim.
//! 3. Otherwise send the *original* message to the completion provider with
//!    the fixed system instruction and a bounded `max_tokens`, and return the
//!    provider's text unchanged.
//!
//! The router holds no mutable state. It is built once at startup and shared
//! behind an `Arc`; concurrent calls need no coordination. Input validation
//! happens before `route` is called. Provider failures come back as
//! `ProviderError` tags; there is no retry and no caching.
//!
use crate::common::provider::{CompletionProvider, CompletionRequest};
use crate::core::error::ProviderError;
use crate::core::rules::KeywordRule;
use std::sync::Arc;
use tracing::debug;

/// Default system instruction sent with delegated messages.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI assistant. Keep responses professional but personal, and maintain a natural conversation flow.";

/// Default completion length bound.
pub const DEFAULT_MAX_TOKENS: u32 = 150;

/// Fixed parameters for the delegated path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterSettings {
    pub system_prompt: String,
    pub max_tokens: u32,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Which path produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    /// Answered by the rule at this index in the table.
    Keyword { rule_index: usize },
    /// Answered by the completion provider.
    Completion,
}

/// A routed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

/// Chooses between a static keyword answer and provider delegation.
pub struct ResponseRouter {
    rules: Vec<KeywordRule>,
    provider: Arc<dyn CompletionProvider>,
    settings: RouterSettings,
}

impl ResponseRouter {
    pub fn new(
        rules: Vec<KeywordRule>,
        provider: Arc<dyn CompletionProvider>,
        settings: RouterSettings,
    ) -> Self {
        Self {
            rules,
            provider,
            settings,
        }
    }

    /// Finds the first rule matching `message`, with its index.
    pub fn match_rule(&self, message: &str) -> Option<(usize, &KeywordRule)> {
        let lowered = message.to_lowercase();
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(&lowered))
    }

    /// Answers `message`, delegating to the provider when no rule matches.
    pub async fn route(&self, message: &str) -> Result<Reply, ProviderError> {
        if let Some((rule_index, rule)) = self.match_rule(message) {
            debug!("Message matched keyword rule #{}", rule_index);
            return Ok(Reply {
                text: rule.answer.clone(),
                source: ReplySource::Keyword { rule_index },
            });
        }

        debug!("No keyword rule matched; delegating to completion provider");
        let text = self
            .provider
            .complete(CompletionRequest {
                system_prompt: self.settings.system_prompt.clone(),
                user_message: message.to_string(),
                max_tokens: self.settings.max_tokens,
            })
            .await?;

        Ok(Reply {
            text,
            source: ReplySource::Completion,
        })
    }
}

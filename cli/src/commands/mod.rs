//! # VoiceChat Command Modules
//!
//! File: cli/src/commands/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the top-level commands of the VoiceChat CLI so that
//! `main.rs` can route to their handlers.
//!
//! ## Command Groups
//!
//! - `serve`: The chat backend HTTP server
//! - `chat`: Terminal client (`chat` REPL and one-shot `ask`)
//! - `rules`: Prints the effective keyword rules
//!
//! Each command defines its own arguments structure and an async handler.
//!

/// Terminal client for the chat backend. Provides both `chat` and `ask`.
pub mod chat;
/// Lists the keyword rules the router matches against.
pub mod rules;
/// The chat backend: configuration, handlers, middleware, and server loop.
pub mod serve;

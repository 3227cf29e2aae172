//! # VoiceChat Core
//!
//! File: cli/src/core/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Core pieces shared by every command:
//! - `config`: TOML configuration loading, merging, and validation
//! - `error`: Error taxonomy and the crate-wide `Result` alias
//! - `rules`: `KeywordRule` and the built-in rule table
//! - `router`: `ResponseRouter`, the keyword-or-provider decision
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config;
//! use crate::core::error::{ChatError, ProviderError, Result};
//! use crate::core::router::{ResponseRouter, RouterSettings};
//! ```
//!
pub mod config;
pub mod error;
pub mod router;
pub mod rules;

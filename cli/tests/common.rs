//! # VoiceChat CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file
//! is compiled as its own crate and runs the real `voicechat` binary.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::Path;

/// # Get VoiceChat Command (`voicechat_cmd`)
///
/// Creates an `assert_cmd::Command` for the compiled `voicechat` binary.
///
/// ## Panics
/// Panics if the binary cannot be found via `Command::cargo_bin`.
pub fn voicechat_cmd() -> Command {
    Command::cargo_bin("voicechat").expect("Failed to find voicechat binary for testing")
}

/// # Isolated Command (`isolated_cmd`)
///
/// Like `voicechat_cmd`, but runs inside `dir` with the user config directory
/// pointed at it too, so no real `.voicechat.toml` or user config is picked up.
pub fn isolated_cmd(dir: &Path) -> Command {
    let mut cmd = voicechat_cmd();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("VOICECHAT_API_URL")
        .env_remove("PORT")
        .env_remove("FRONTEND_URL")
        .env_remove("RUST_LOG");
    cmd
}

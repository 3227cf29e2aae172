//! # Keyword Rules Listing
//!
//! File: cli/src/commands/rules/mod.rs
//! Author: Christi Mahu
//!
//! `voicechat rules` prints the keyword table the server would use, in
//! matching order: the `[[rules]]` from the loaded config if present,
//! otherwise the built-in table.
//!
use crate::core::config;
use crate::core::error::Result;
use crate::core::rules::KeywordRule;
use clap::Parser;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

/// Arguments for `voicechat rules`.
#[derive(Parser, Debug)]
pub struct RulesArgs {
    /// Path to a TOML config file (skips the project/user config search).
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

pub async fn handle_rules(args: RulesArgs) -> Result<()> {
    info!("Handling rules command with args: {:?}", args);
    let config = config::load_config(args.config.as_deref())?;
    print!("{}", render_rules(&config.effective_rules()));
    Ok(())
}

/// One block per rule: index and keywords on the first line, answer indented.
fn render_rules(rules: &[KeywordRule]) -> String {
    let mut out = String::new();
    for (index, rule) in rules.iter().enumerate() {
        let keywords = rule
            .keywords
            .iter()
            .map(|k| format!("\"{k}\""))
            .collect::<Vec<_>>()
            .join(", ");
        // Writing to a String cannot fail.
        let _ = writeln!(out, "[{index}] {keywords}");
        let _ = writeln!(out, "    {}", rule.answer);
    }
    out
}

//! # VoiceChat Main Entry Point
//!
//! File: cli/src/main.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This file serves as the main entry point for the VoiceChat CLI.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//!
//! ## Examples
//!
//! ```bash
//! # Run the backend with request logging
//! OPENAI_API_KEY=sk-... voicechat -v serve
//!
//! # Talk to it from another terminal
//! voicechat chat
//! ```
//!
//! Command processing flow:
//! 1. Parse command-line args via Clap
//! 2. Configure logging based on verbosity level
//! 3. Route to the command handler
//! 4. Print any error and exit with status 1
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // serve, chat/ask, rules
mod common; // wire types and the completion provider
mod core; // errors, config, keyword rules, response router

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "voicechat",
    about = "Voice chatbot backend and terminal client",
    long_about = "Answers chat messages from a keyword table, falling back to an\n\
                  OpenAI-compatible completion API for everything else.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Run the chat backend HTTP server.
    #[command(alias = "s")]
    Serve(commands::serve::ServeArgs),
    /// Chat with the backend from the terminal.
    #[command(alias = "c")]
    Chat(commands::chat::ChatArgs),
    /// Send one message and print the reply.
    Ask(commands::chat::AskArgs),
    /// List the keyword rules in matching order.
    Rules(commands::rules::RulesArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Serve(args) => commands::serve::handle_serve(args).await,
        Commands::Chat(args) => commands::chat::handle_chat(args).await,
        Commands::Ask(args) => commands::chat::handle_ask(args).await,
        Commands::Rules(args) => commands::rules::handle_rules(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

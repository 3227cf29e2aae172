//! # VoiceChat Terminal Client
//!
//! File: cli/src/commands/chat/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The terminal counterpart of the browser widget. Two commands share the
//! same backend client:
//!
//! - `voicechat chat`: a conversation loop. Blank input is ignored, `bye`
//!   ends the session, and failed requests are reported without leaving it.
//! - `voicechat ask <MESSAGE>`: one question, one printed answer. Errors exit
//!   non-zero.
//!
//! ## Architecture
//!
//! - `client.rs`: `ChatClient`, the HTTP client for `POST /api/chat`
//! - `speech.rs`: the `SpeechIo` capability and its terminal implementation
//!
//! ## Examples
//!
//! ```bash
//! voicechat chat --api-url http://localhost:3003
//! voicechat ask "What's your superpower?"
//! ```
//!
use crate::core::error::{ChatError, Result};
use anyhow::anyhow;
use clap::Parser;
use tracing::{debug, info, warn};

pub use client::ChatClient;
pub use speech::{SpeechIo, TerminalSpeech};

/// HTTP client for the chat backend.
pub mod client;

/// Speech capability seam and the terminal implementation.
pub mod speech;

/// Backend URL used when neither `--api-url` nor `VOICECHAT_API_URL` is set.
pub const DEFAULT_API_URL: &str = "http://localhost:3003";

/// Name the bot's lines are labelled with.
const BOT_NAME: &str = "Bot";
const QUIT_WORD: &str = "bye";
const GREETING: &str = "Hi! Ask me anything. Say 'bye' to quit.";
const FAREWELL: &str = "Goodbye!";
const APOLOGY: &str = "Sorry, I ran into an issue. Can you try again?";

/// Arguments for `voicechat chat`.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Base URL of the chat backend.
    #[arg(long, env = "VOICECHAT_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
}

/// Arguments for `voicechat ask`.
#[derive(Parser, Debug)]
pub struct AskArgs {
    /// Base URL of the chat backend.
    #[arg(long, env = "VOICECHAT_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// The message to send. Several words are joined with spaces.
    #[arg(required = true, num_args = 1.., value_name = "MESSAGE")]
    pub message: Vec<String>,
}

/// # Handle Chat Command (`handle_chat`)
///
/// Runs the conversation loop on stdin/stdout until `bye` or end of input.
pub async fn handle_chat(args: ChatArgs) -> Result<()> {
    info!("Handling chat command with args: {:?}", args);
    let client = ChatClient::new(&args.api_url)?;
    info!("Chatting with {}", client.endpoint());
    let mut speech = TerminalSpeech::stdio(BOT_NAME);
    run_conversation(&client, &mut speech).await
}

/// # Handle Ask Command (`handle_ask`)
///
/// Sends a single message and prints the reply.
///
/// ## Errors
///
/// A blank message is rejected with `ChatError::Validation` before any
/// request is made. Backend failures are returned as `ChatError::Api` or
/// `ChatError::Client`.
pub async fn handle_ask(args: AskArgs) -> Result<()> {
    info!("Handling ask command with args: {:?}", args);
    let message = args.message.join(" ");
    if message.trim().is_empty() {
        return Err(anyhow!(ChatError::Validation(
            "message must not be empty".into()
        )));
    }

    let client = ChatClient::new(&args.api_url)?;
    let reply = client.send(&message).await?;
    println!("{}", reply);
    Ok(())
}

/// Drives one chat session over any `SpeechIo`.
///
/// Errors from the backend are reported to the user and the loop continues;
/// only failures of the speech channel itself end it early.
pub async fn run_conversation<S: SpeechIo>(client: &ChatClient, speech: &mut S) -> Result<()> {
    speech.text_to_speech(GREETING)?;

    while let Some(heard) = speech.speech_to_text()? {
        let trimmed = heard.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case(QUIT_WORD) {
            speech.text_to_speech(FAREWELL)?;
            return Ok(());
        }

        match client.send(&heard).await {
            Ok(reply) => speech.text_to_speech(&reply)?,
            Err(e) => {
                warn!("Chat request failed: {:?}", e);
                let shown = match e.downcast_ref::<ChatError>() {
                    Some(ChatError::Api { message, .. }) => message.clone(),
                    _ => e.to_string(),
                };
                speech.report_error(&shown)?;
                speech.text_to_speech(APOLOGY)?;
            }
        }
    }

    debug!("Input closed; ending chat session");
    Ok(())
}

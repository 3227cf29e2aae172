//! # Speech Capability
//!
//! File: cli/src/commands/chat/speech.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The chat loop talks to the user only through `SpeechIo`. A voice front end
//! would implement it with a recognizer and a synthesizer; `TerminalSpeech`
//! implements it with typed lines in and printed lines out.
//!
use crate::core::error::Result;
use anyhow::Context;
use std::io::{self, BufRead, Write};

/// Two-way speech channel between the user and the bot.
pub trait SpeechIo {
    /// Waits for the next utterance. `None` means the input has closed.
    fn speech_to_text(&mut self) -> Result<Option<String>>;

    /// Speaks a bot reply.
    fn text_to_speech(&mut self, text: &str) -> Result<()>;

    /// Tells the user something went wrong.
    fn report_error(&mut self, message: &str) -> Result<()>;
}

/// `SpeechIo` over a line reader and a writer.
pub struct TerminalSpeech<R, W> {
    input: R,
    output: W,
    speaker: String,
}

impl TerminalSpeech<io::StdinLock<'static>, io::Stdout> {
    /// Reads from stdin and writes to stdout.
    ///
    /// Reads block the calling worker thread. The chat loop is strictly
    /// sequential, so nothing else is scheduled while it waits for a line.
    pub fn stdio(speaker: &str) -> Self {
        Self::new(io::stdin().lock(), io::stdout(), speaker)
    }
}

impl<R: BufRead, W: Write> TerminalSpeech<R, W> {
    pub fn new(input: R, output: W, speaker: &str) -> Self {
        Self {
            input,
            output,
            speaker: speaker.to_string(),
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> SpeechIo for TerminalSpeech<R, W> {
    fn speech_to_text(&mut self) -> Result<Option<String>> {
        write!(self.output, "You: ").context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            writeln!(self.output).context("Failed to write output")?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn text_to_speech(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}: {}", self.speaker, text).context("Failed to write reply")
    }

    fn report_error(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{} (error): {}", self.speaker, message)
            .context("Failed to write error")
    }
}

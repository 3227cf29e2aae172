//! # Chat API Wire Types
//!
//! File: cli/src/common/api.rs
//! Author: Christi Mahu
//!
//! JSON shapes shared by the backend handlers and the terminal client.
//!
use serde::{Deserialize, Serialize};

/// Path of the chat endpoint.
pub const CHAT_PATH: &str = "/api/chat";

/// Upper bound on a chat message, in UTF-16 code units.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// `POST /api/chat` request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// `POST /api/chat` success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

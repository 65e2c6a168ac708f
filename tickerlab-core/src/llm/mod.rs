//! Hosted conversational model clients.

pub mod gemini;

pub use gemini::GeminiChat;

use thiserror::Error;

/// Failures talking to a hosted model.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("rate limited by model provider")]
    RateLimited,

    #[error("model server error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("authentication failed: check the API key")]
    Authentication,

    #[error("model API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model returned no text{}", .0.as_deref().map(|r| format!(" (blocked: {r})")).unwrap_or_default())]
    EmptyResponse(Option<String>),

    #[error("failed to parse model response: {0}")]
    Parse(String),
}

impl LlmError {
    /// Worth retrying: the same request may succeed a moment later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::Transport(_) | LlmError::Timeout | LlmError::RateLimited | LlmError::Server { .. }
        )
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else if e.is_decode() {
            LlmError::Parse(e.to_string())
        } else {
            LlmError::Transport(e.to_string())
        }
    }
}

/// A stateful chat: each call continues the same conversation.
pub trait ChatModel {
    /// Model identifier, for logs and transcripts.
    fn model_name(&self) -> &str;

    /// Send one user message and return the model's reply text.
    ///
    /// A failed call must leave the conversation as it was.
    fn send_message(&mut self, text: &str) -> Result<String, LlmError>;
}

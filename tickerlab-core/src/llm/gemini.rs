//! Gemini `generateContent` chat client.
//!
//! The REST endpoint is stateless, so the conversation lives here: every request
//! carries the full history, and a turn is appended only once it succeeds.

use super::{ChatModel, LlmError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: &'a [Content],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Extract reply text from a `generateContent` body: all parts of the first
/// candidate, concatenated.
pub fn parse_reply(body: &str) -> Result<String, LlmError> {
    let resp: GenerateResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Parse(e.to_string()))?;
    let text: String = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse(
            resp.prompt_feedback.and_then(|f| f.block_reason),
        ));
    }
    Ok(text)
}

pub struct GeminiChat {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
    history: Vec<Content>,
}

impl GeminiChat {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
            history: Vec::new(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl ChatModel for GeminiChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn send_message(&mut self, text: &str) -> Result<String, LlmError> {
        let mut contents = self.history.clone();
        contents.push(Content::text("user", text));

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest { contents: &contents })
            .send()?;

        let status = resp.status();
        let body = resp.text()?;
        match status.as_u16() {
            200..=299 => {}
            429 => return Err(LlmError::RateLimited),
            401 | 403 => return Err(LlmError::Authentication),
            s if s >= 500 => return Err(LlmError::Server { status: s, body }),
            s => return Err(LlmError::Api { status: s, body }),
        }

        let reply = parse_reply(&body)?;
        contents.push(Content::text("model", &reply));
        self.history = contents;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_candidate_parts() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello, "},{"text":"world"}]},
            "finishReason":"STOP"}],"usageMetadata":{"totalTokenCount":12}}"#;
        assert_eq!(parse_reply(body).unwrap(), "Hello, world");
    }

    #[test]
    fn blocked_prompt_is_empty_response() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert!(matches!(
            parse_reply(body),
            Err(LlmError::EmptyResponse(Some(r))) if r == "SAFETY"
        ));
    }

    #[test]
    fn malformed_body_is_parse_error() {
        assert!(matches!(parse_reply("not json"), Err(LlmError::Parse(_))));
    }

    #[test]
    fn endpoint_includes_model() {
        let chat = GeminiChat::new("k", DEFAULT_MODEL, Duration::from_secs(5))
            .unwrap()
            .with_base_url("http://localhost:1");
        assert_eq!(chat.endpoint(), "http://localhost:1/models/gemini-2.0-flash:generateContent");
        assert!(chat.history().is_empty());
    }

    #[test]
    fn unreachable_server_leaves_history_untouched() {
        let mut chat = GeminiChat::new("k", DEFAULT_MODEL, Duration::from_millis(200))
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let err = chat.send_message("hi").unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err}");
        assert!(chat.history().is_empty());
    }
}

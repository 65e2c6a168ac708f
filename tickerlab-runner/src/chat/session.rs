//! Read-send-print-log loop around a [`ChatModel`].

use std::io::{self, BufRead, Write};

use tickerlab_core::llm::{ChatModel, LlmError};
use tickerlab_core::retry::{retry_with_backoff, RetryPolicy};

use super::command::{parse_command, Command};
use super::context::ContextSources;
use super::transcript::Transcript;

/// Result of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Text to show the user. Errors are folded in as text.
    Reply(String),
    /// Nothing to send (blank input).
    Skip,
    Exit,
}

/// One conversation: the model, where context comes from, where the
/// transcript goes. Built at startup and dropped when the loop ends.
pub struct ChatSession<M: ChatModel> {
    model: M,
    context: ContextSources,
    transcript: Transcript,
    retry: RetryPolicy,
}

impl<M: ChatModel> ChatSession<M> {
    pub fn new(model: M, context: ContextSources, transcript: Transcript, retry: RetryPolicy) -> Self {
        Self {
            model,
            context,
            transcript,
            retry,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Send `prompt`, retrying transient failures. Never fails: an exhausted
    /// or permanent error becomes the reply text.
    fn ask(&mut self, prompt: &str) -> String {
        let model = &mut self.model;
        match retry_with_backoff(&self.retry, LlmError::is_transient, |attempt| {
            if attempt > 0 {
                tracing::info!(attempt = attempt + 1, "retrying model request");
            }
            model.send_message(prompt)
        }) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(model = self.model.model_name(), error = %e, "model request failed");
                format!("Error: {e}")
            }
        }
    }

    /// Handle one line of input and record the exchange.
    pub fn handle_turn(&mut self, input: &str) -> TurnOutcome {
        let reply = match parse_command(input) {
            Command::Exit => return TurnOutcome::Exit,
            Command::Empty => return TurnOutcome::Skip,
            Command::Plain(text) => self.ask(&text),
            Command::News { date, question } => match self.context.build_prompt(date, &question) {
                Ok(prompt) => self.ask(&prompt),
                Err(e) => format!("Error: {e}"),
            },
        };

        if let Err(e) = self.transcript.record(input.trim(), &reply) {
            tracing::warn!(path = %self.transcript.path().display(), error = %e, "failed to save transcript");
        }
        TurnOutcome::Reply(reply)
    }
}

/// Prompt on `output`, read lines from `input`, until `exit`/`quit` or EOF.
pub fn run_repl<M: ChatModel, R: BufRead, W: Write>(
    session: &mut ChatSession<M>,
    mut input: R,
    mut output: W,
) -> io::Result<()> {
    writeln!(output, "Chat started with {} (type 'exit' or 'quit' to leave)", session.model().model_name())?;
    writeln!(
        output,
        "News mode: news [YYYY-MM-DD] <question> (reads {})",
        session.context.sentiment_file.display()
    )?;

    let mut line = String::new();
    loop {
        write!(output, "You: ")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        match session.handle_turn(&line) {
            TurnOutcome::Exit => break,
            TurnOutcome::Skip => continue,
            TurnOutcome::Reply(reply) => writeln!(output, "Model: {reply}")?,
        }
    }
    writeln!(output, "Conversation saved to: {}", session.transcript().path().display())?;
    Ok(())
}

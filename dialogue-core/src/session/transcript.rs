//! Session that replays a client-owned transcript

use super::{Session, SessionKind};
use crate::client::CompletionClient;
use crate::error::TurnError;
use crate::protocol::Transcript;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Owns the message history and sends all of it on every call
///
/// A failed turn is not rolled back: its user message stays in the
/// transcript and is resent, unanswered, with the next prompt.
pub struct TranscriptSession {
    client: Arc<dyn CompletionClient>,
    model: String,
    transcript: Transcript,
}

impl TranscriptSession {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            transcript: Transcript::with_system(system_prompt),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Append the prompt, send the whole transcript, append the answer
    pub async fn ask(&mut self, user_text: &str) -> Result<String, TurnError> {
        self.transcript.push_user(user_text);
        debug!(
            "Sending transcript of {} messages to {}",
            self.transcript.len(),
            self.model
        );

        let completion = match self
            .client
            .complete_chat(&self.model, self.transcript.messages())
            .await
        {
            Ok(completion) => completion,
            Err(e) => {
                warn!(
                    "Chat turn failed ({}); unanswered prompt kept in transcript",
                    e.class()
                );
                return Err(e);
            }
        };

        self.transcript.push_assistant(completion.answer.clone());
        Ok(completion.answer)
    }
}

#[async_trait]
impl Session for TranscriptSession {
    fn kind(&self) -> SessionKind {
        SessionKind::Transcript
    }

    async fn take_turn(&mut self, prompt: &str) -> Result<String, TurnError> {
        self.ask(prompt).await
    }
}

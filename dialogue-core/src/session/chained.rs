//! Session that chains turns through server-issued references

use super::{Session, SessionKind};
use crate::client::CompletionClient;
use crate::error::TurnError;
use crate::protocol::{ChainedRequest, ExchangeReference};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Holds only the reference to the last successful exchange
///
/// Nothing is recorded until a call succeeds: a failed turn leaves
/// `last_reference` pointing at the last good exchange, and instructions
/// keep being sent until the first success.
pub struct ChainedSession {
    client: Arc<dyn CompletionClient>,
    model: String,
    instructions: String,
    last_reference: Option<ExchangeReference>,
    first_turn_done: bool,
}

impl ChainedSession {
    /// `instructions` are what [`Session::take_turn`] passes as system instructions
    pub fn new(
        client: Arc<dyn CompletionClient>,
        model: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            instructions: instructions.into(),
            last_reference: None,
            first_turn_done: false,
        }
    }

    pub fn last_reference(&self) -> Option<&ExchangeReference> {
        self.last_reference.as_ref()
    }

    pub fn first_turn_done(&self) -> bool {
        self.first_turn_done
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, user_text: &str, system_instructions: &str) -> ChainedRequest {
        let mut request = ChainedRequest::new(user_text);
        if !self.first_turn_done {
            request = request.with_instructions(system_instructions);
        }
        if let Some(reference) = &self.last_reference {
            request = request.with_previous_reference(reference.clone());
        }
        request
    }

    /// Send one input, continuing from the last successful exchange
    pub async fn ask(
        &mut self,
        user_text: &str,
        system_instructions: &str,
    ) -> Result<String, TurnError> {
        let request = self.build_request(user_text, system_instructions);
        debug!(
            "Sending chained turn to {} (instructions: {}, previous: {})",
            self.model,
            request.instructions.is_some(),
            request
                .previous_reference
                .as_ref()
                .map(ExchangeReference::as_str)
                .unwrap_or("none")
        );

        let completion = match self.client.complete_chained(&self.model, &request).await {
            Ok(completion) => completion,
            Err(e) => {
                warn!("Chained turn failed ({}); reference unchanged", e.class());
                return Err(e);
            }
        };

        self.last_reference = Some(completion.reference);
        self.first_turn_done = true;
        Ok(completion.answer)
    }
}

#[async_trait]
impl Session for ChainedSession {
    fn kind(&self) -> SessionKind {
        SessionKind::Chained
    }

    async fn take_turn(&mut self, prompt: &str) -> Result<String, TurnError> {
        let instructions = self.instructions.clone();
        self.ask(prompt, &instructions).await
    }
}

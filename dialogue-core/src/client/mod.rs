//! Completion client abstraction
//!
//! A [`CompletionClient`] performs one authenticated model call in either
//! of the two shapes the sessions need. The reqwest-backed implementation
//! lives in [`crate::http`].

pub mod error;
pub mod retry;
pub mod wire;

pub use error::{ProviderError, ProviderResult, ResponseShapeError};
pub use retry::RetryPolicy;

use crate::error::TurnError;
use crate::protocol::{ChainedCompletion, ChainedRequest, ChatCompletion, Message};
use async_trait::async_trait;
use std::sync::Arc;

/// Performs authenticated model calls
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the whole message history and return the assistant's answer
    async fn complete_chat(
        &self,
        model: &str,
        messages: &[Message],
    ) -> Result<ChatCompletion, TurnError>;

    /// Send one new input, optionally continuing from a previous exchange
    async fn complete_chained(
        &self,
        model: &str,
        request: &ChainedRequest,
    ) -> Result<ChainedCompletion, TurnError>;
}

#[async_trait]
impl<C: CompletionClient + ?Sized> CompletionClient for Arc<C> {
    async fn complete_chat(
        &self,
        model: &str,
        messages: &[Message],
    ) -> Result<ChatCompletion, TurnError> {
        (**self).complete_chat(model, messages).await
    }

    async fn complete_chained(
        &self,
        model: &str,
        request: &ChainedRequest,
    ) -> Result<ChainedCompletion, TurnError> {
        (**self).complete_chained(model, request).await
    }
}

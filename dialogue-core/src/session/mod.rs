//! Conversation sessions
//!
//! Two ways of keeping a multi-turn exchange coherent:
//! - [`TranscriptSession`] owns the full message history and resends it
//!   on every call.
//! - [`ChainedSession`] owns only the reference to the last completed
//!   exchange; the server reconstructs the context.
//!
//! Both mutate their state through `&mut self`, so one session can only
//! have one turn in flight at a time.

mod chained;
mod transcript;

pub use chained::ChainedSession;
pub use transcript::TranscriptSession;

use crate::error::TurnError;
use async_trait::async_trait;
use std::fmt;

/// Which state-ownership model a session uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Client-owned transcript
    Transcript,
    /// Server-owned thread
    Chained,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Transcript => f.write_str("transcript"),
            SessionKind::Chained => f.write_str("chained"),
        }
    }
}

/// A stateful multi-turn conversation, driven one prompt at a time
#[async_trait]
pub trait Session: Send {
    fn kind(&self) -> SessionKind;

    /// Ask one prompt and return the answer
    async fn take_turn(&mut self, prompt: &str) -> Result<String, TurnError>;
}

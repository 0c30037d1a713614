//! Core protocol types for dialogue turns

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions that guide the model's behavior
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };
        f.write_str(role)
    }
}

/// A single message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: MessageRole,
    content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Client-held, append-only message history
///
/// The only system message is the one given to [`Transcript::with_system`],
/// and it is always first. Entries are never removed or reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// An empty transcript with no system message
    pub fn new() -> Self {
        Self::default()
    }

    /// A transcript that starts with a system message
    pub fn with_system(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(content)],
        }
    }

    pub(crate) fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub(crate) fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// All messages, in the order they are sent to the model
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Server-issued identifier of a completed exchange
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeReference(String);

impl ExchangeReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExchangeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExchangeReference {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One chained-style turn request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainedRequest {
    /// The new user input
    pub input: String,

    /// System instructions; present until the session has completed a turn
    pub instructions: Option<String>,

    /// The exchange this turn continues from
    pub previous_reference: Option<ExchangeReference>,
}

impl ChainedRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            instructions: None,
            previous_reference: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_previous_reference(mut self, reference: ExchangeReference) -> Self {
        self.previous_reference = Some(reference);
        self
    }
}

/// Result of a chat-style call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCompletion {
    pub answer: String,
}

/// Result of a chained-style call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainedCompletion {
    pub answer: String,
    pub reference: ExchangeReference,
}

//! Dialogue Core Library
//!
//! Session continuity for multi-turn dialogues with a hosted model endpoint
//! that requires bearer-token authentication. Two state-ownership models
//! are provided:
//!
//! - [`session::TranscriptSession`] replays a client-owned transcript on
//!   every call (chat completions).
//! - [`session::ChainedSession`] sends only the new input plus a reference
//!   to the previous exchange (responses).
//!
//! Both sit on an injected [`client::CompletionClient`], which in turn uses
//! an injected [`auth::CredentialProvider`]. A [`runner::TurnRunner`] drives
//! either kind through a list of prompts.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod protocol;
pub mod runner;
pub mod session;

pub use auth::{AccessToken, AuthError, CredentialProvider};
pub use client::{CompletionClient, ProviderError, ResponseShapeError};
pub use config::{ConfigError, DialogueConfig};
pub use error::TurnError;
pub use http::AzureOpenAIClient;
pub use runner::{TurnFailure, TurnRecord, TurnReporter, TurnRunner};
pub use session::{ChainedSession, Session, SessionKind, TranscriptSession};

/// Returns the version of the Dialogue Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

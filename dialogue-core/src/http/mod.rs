//! HTTP transport for the completion client
//!
//! This module implements the HTTP layer, handling:
//! - Connection pooling and client management
//! - Bearer authentication through a credential provider
//! - Error mapping and retry hints
//! - Request ID generation and correlation

pub mod client;
pub mod error;

pub use client::AzureOpenAIClient;
pub use error::{map_http_error, parse_retry_after};

use crate::client::wire::{CHAT_COMPLETIONS_PATH, RESPONSES_PATH};
use std::fmt;

/// Type of API call being made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Chat completions (client-owned transcript)
    Chat,
    /// Responses (server-owned thread)
    Responses,
}

impl CallKind {
    /// Endpoint path for this call kind, relative to the endpoint base
    pub fn path(&self) -> &'static str {
        match self {
            CallKind::Chat => CHAT_COMPLETIONS_PATH,
            CallKind::Responses => RESPONSES_PATH,
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

//! Protocol module for dialogue data structures
//!
//! These are the canonical, transport-independent types the sessions work
//! with. Wire formats live in [`crate::client::wire`].

pub mod types;

pub use types::{
    ChainedCompletion, ChainedRequest, ChatCompletion, ExchangeReference, Message, MessageRole,
    Transcript,
};

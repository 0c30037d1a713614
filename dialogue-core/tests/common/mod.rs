//! Shared test doubles for session and runner tests

#![allow(dead_code)]

use async_trait::async_trait;
use dialogue_core::auth::{AccessToken, AuthError, CredentialProvider};
use dialogue_core::protocol::{
    ChainedCompletion, ChainedRequest, ChatCompletion, ExchangeReference, Message,
};
use dialogue_core::{CompletionClient, ProviderError, TurnError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A completion client that replays scripted outcomes and records every request
#[derive(Default)]
pub struct ScriptedClient {
    chat_replies: Mutex<VecDeque<Result<String, TurnError>>>,
    chained_replies: Mutex<VecDeque<Result<(String, String), TurnError>>>,
    chat_requests: Mutex<Vec<Vec<Message>>>,
    chained_requests: Mutex<Vec<ChainedRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chat_ok(self, answer: &str) -> Self {
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(Ok(answer.to_string()));
        self
    }

    pub fn chat_err(self, error: TurnError) -> Self {
        self.chat_replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn chained_ok(self, answer: &str, reference: &str) -> Self {
        self.chained_replies
            .lock()
            .unwrap()
            .push_back(Ok((answer.to_string(), reference.to_string())));
        self
    }

    pub fn chained_err(self, error: TurnError) -> Self {
        self.chained_replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn chat_requests(&self) -> Vec<Vec<Message>> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn chained_requests(&self) -> Vec<ChainedRequest> {
        self.chained_requests.lock().unwrap().clone()
    }
}

fn exhausted() -> TurnError {
    TurnError::Provider(ProviderError::Custom {
        code: "SCRIPT_EXHAUSTED".to_string(),
        message: "no scripted reply left".to_string(),
    })
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete_chat(
        &self,
        _model: &str,
        messages: &[Message],
    ) -> Result<ChatCompletion, TurnError> {
        self.chat_requests.lock().unwrap().push(messages.to_vec());
        let reply = self.chat_replies.lock().unwrap().pop_front();
        match reply {
            Some(Ok(answer)) => Ok(ChatCompletion { answer }),
            Some(Err(err)) => Err(err),
            None => Err(exhausted()),
        }
    }

    async fn complete_chained(
        &self,
        _model: &str,
        request: &ChainedRequest,
    ) -> Result<ChainedCompletion, TurnError> {
        self.chained_requests.lock().unwrap().push(request.clone());
        let reply = self.chained_replies.lock().unwrap().pop_front();
        match reply {
            Some(Ok((answer, reference))) => Ok(ChainedCompletion {
                answer,
                reference: ExchangeReference::new(reference),
            }),
            Some(Err(err)) => Err(err),
            None => Err(exhausted()),
        }
    }
}

/// A completion client whose calls never finish
pub struct PendingClient;

#[async_trait]
impl CompletionClient for PendingClient {
    async fn complete_chat(
        &self,
        _model: &str,
        _messages: &[Message],
    ) -> Result<ChatCompletion, TurnError> {
        std::future::pending().await
    }

    async fn complete_chained(
        &self,
        _model: &str,
        _request: &ChainedRequest,
    ) -> Result<ChainedCompletion, TurnError> {
        std::future::pending().await
    }
}

/// A credential provider that counts how often it is asked
pub struct CountingCredential {
    token: String,
    calls: AtomicUsize,
    fail_with: Option<AuthError>,
}

impl CountingCredential {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            calls: AtomicUsize::new(0),
            fail_with: None,
        }
    }

    pub fn failing(error: AuthError) -> Self {
        Self {
            token: String::new(),
            calls: AtomicUsize::new(0),
            fail_with: Some(error),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for CountingCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(AccessToken::new(self.token.as_str())),
        }
    }
}

pub fn network_error() -> TurnError {
    TurnError::Provider(ProviderError::Network {
        message: "connection reset".to_string(),
    })
}

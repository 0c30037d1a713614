//! Completion client over HTTPS using reqwest

use crate::auth::{credential_from_source, CredentialProvider};
use crate::client::wire::{self, ChatCompletionsBody, ResponsesBody};
use crate::client::{CompletionClient, ProviderError, ResponseShapeError, RetryPolicy};
use crate::config::DialogueConfig;
use crate::error::TurnError;
use crate::http::CallKind;
use crate::protocol::{ChainedCompletion, ChainedRequest, ChatCompletion, Message};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Maximum response size (10MB)
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Default user agent
const USER_AGENT: &str = concat!("dialogue-core/", env!("CARGO_PKG_VERSION"));

/// Completion client for an Azure OpenAI (v1) endpoint with bearer authentication
pub struct AzureOpenAIClient {
    client: Client,
    base_url: String,
    credential: Arc<dyn CredentialProvider>,
    scope: String,
    max_output_tokens: u32,
    retry: RetryPolicy,
    max_response_size: usize,
}

impl AzureOpenAIClient {
    /// Create a client from a validated configuration and a credential provider
    pub fn new(
        config: &DialogueConfig,
        credential: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ProviderError> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| ProviderError::Custom {
                code: "CLIENT_BUILD".to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            credential,
            scope: config.scope.clone(),
            max_output_tokens: config.max_output_tokens,
            retry: config.retry.clone(),
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// Create a client using the credential source named in the configuration
    pub fn from_config(config: &DialogueConfig) -> Result<Self, ProviderError> {
        Self::new(config, credential_from_source(&config.credential))
    }

    /// Full URL for a call kind
    pub fn url(&self, kind: CallKind) -> String {
        format!("{}/{}", self.base_url, kind.path())
    }

    /// POST a JSON body, retrying retryable provider errors per the policy
    async fn post_json<B>(&self, kind: CallKind, body: &B) -> Result<Value, TurnError>
    where
        B: Serialize + Sync,
    {
        let mut attempt = 0;

        loop {
            let request_id = Uuid::new_v4();
            match self.send_once(kind, body, request_id).await {
                Ok(payload) => return Ok(payload),
                Err(TurnError::Provider(error)) if self.retry.should_retry(&error, attempt) => {
                    let delay = self.retry.calculate_delay(attempt, &error);
                    warn!(
                        "Retrying {} in {:?} after error: {} [request_id: {}]",
                        kind, delay, error, request_id
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// One authenticated attempt
    async fn send_once<B>(
        &self,
        kind: CallKind,
        body: &B,
        request_id: Uuid,
    ) -> Result<Value, TurnError>
    where
        B: Serialize + Sync,
    {
        // A fresh token per outbound request; the provider decides whether to cache
        let token = self.credential.get_token(&self.scope).await?;

        let url = self.url(kind);
        info!("POST {} [request_id: {}]", url, request_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.token.expose_secret())
            .header("X-Request-ID", request_id.to_string())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!("Request timeout for {} [request_id: {}]", kind, request_id);
                } else {
                    error!("Request error for {} [request_id: {}]: {}", kind, request_id, e);
                }
                ProviderError::from(e)
            })?;

        let status = response.status();
        debug!("Response status: {} [request_id: {}]", status, request_id);

        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.ok();

            warn!(
                "Request failed with status {} for {} [request_id: {}]",
                status, kind, request_id
            );

            return Err(crate::http::error::map_http_error(
                status,
                Some(&headers),
                body,
                request_id,
            )
            .into());
        }

        if let Some(content_length) = response.content_length() {
            if content_length as usize > self.max_response_size {
                return Err(self.too_large(content_length as usize, request_id).into());
            }
        }

        let text = response.text().await.map_err(|e| ProviderError::Network {
            message: format!("Failed to read response body: {} [request_id: {}]", e, request_id),
        })?;

        if text.len() > self.max_response_size {
            return Err(self.too_large(text.len(), request_id).into());
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(payload) => Ok(payload),
            Err(e) => {
                error!("Response from {} is not JSON [request_id: {}]: {}", kind, request_id, e);
                Err(ResponseShapeError::new("response body is not JSON", text).into())
            }
        }
    }

    fn too_large(&self, size: usize, request_id: Uuid) -> ProviderError {
        ProviderError::Custom {
            code: "RESPONSE_TOO_LARGE".to_string(),
            message: format!(
                "Response size {} exceeds maximum {} [request_id: {}]",
                size, self.max_response_size, request_id
            ),
        }
    }
}

#[async_trait]
impl CompletionClient for AzureOpenAIClient {
    async fn complete_chat(
        &self,
        model: &str,
        messages: &[Message],
    ) -> Result<ChatCompletion, TurnError> {
        let body = ChatCompletionsBody {
            model,
            messages,
            max_tokens: self.max_output_tokens,
        };

        let payload = self.post_json(CallKind::Chat, &body).await?;
        let answer = wire::parse_chat_answer(&payload)?;
        Ok(ChatCompletion { answer })
    }

    async fn complete_chained(
        &self,
        model: &str,
        request: &ChainedRequest,
    ) -> Result<ChainedCompletion, TurnError> {
        let body = ResponsesBody::from_request(model, request);

        let payload = self.post_json(CallKind::Responses, &body).await?;
        Ok(wire::parse_chained(&payload)?)
    }
}

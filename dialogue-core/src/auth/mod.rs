//! Credential providers
//!
//! A [`CredentialProvider`] produces the bearer token attached to every
//! outbound model call. Sessions never see tokens; only the completion
//! client asks for one, once per outbound request.

mod azure_cli;
mod cache;
mod static_token;

pub use azure_cli::AzureCliCredential;
pub use cache::CachedCredential;
pub use static_token::StaticTokenCredential;

use crate::config::{CredentialSource, SecretString};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Token scope for Azure AI services
pub const COGNITIVE_SERVICES_SCOPE: &str = "https://cognitiveservices.azure.com/.default";

/// Remediation shown when no login session is available
pub const AZ_LOGIN_HINT: &str = "Make sure you've logged in with `az login`";

/// A bearer token and its expiry
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The token value
    pub token: SecretString,

    /// When the token stops being accepted; `None` if unknown
    pub expires_at: Option<SystemTime>,
}

impl AccessToken {
    /// Create a token with no known expiry
    pub fn new(token: impl Into<SecretString>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
        }
    }

    /// Set the expiry time
    pub fn with_expiry(mut self, expires_at: SystemTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// True if the token has a known expiry that falls within `margin` from now
    pub fn expires_within(&self, margin: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at
                .duration_since(SystemTime::now())
                .map(|remaining| remaining <= margin)
                .unwrap_or(true),
            None => false,
        }
    }
}

/// The credential provider could not produce a token
#[derive(Debug, Clone, Error)]
#[error("Failed to acquire access token: {message}")]
pub struct AuthError {
    /// What went wrong
    pub message: String,

    /// How the user can fix it
    pub hint: Option<String>,
}

impl AuthError {
    /// Create an error without a remediation hint
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: None,
        }
    }

    /// Attach a remediation hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Produces bearer tokens for a scope
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Get a token valid for `scope`
    ///
    /// Called once per outbound request; caching is the provider's concern.
    async fn get_token(&self, scope: &str) -> Result<AccessToken, AuthError>;
}

#[async_trait]
impl<P: CredentialProvider + ?Sized> CredentialProvider for Arc<P> {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, AuthError> {
        (**self).get_token(scope).await
    }
}

/// Build the credential provider described by a [`CredentialSource`]
pub fn credential_from_source(source: &CredentialSource) -> Arc<dyn CredentialProvider> {
    match source {
        CredentialSource::AzureCli => Arc::new(CachedCredential::new(AzureCliCredential::new())),
        CredentialSource::Static { token } => Arc::new(StaticTokenCredential::new(token.clone())),
    }
}

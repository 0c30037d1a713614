//! Fixed bearer token

use super::{AccessToken, AuthError, CredentialProvider};
use crate::config::SecretString;
use async_trait::async_trait;

/// Hands out the same token for every scope
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: SecretString,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<SecretString>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken, AuthError> {
        if self.token.is_empty() {
            return Err(AuthError::new("static bearer token is empty"));
        }
        Ok(AccessToken::new(self.token.clone()))
    }
}

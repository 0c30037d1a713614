//! Token caching with refresh ahead of expiry

use super::{AccessToken, AuthError, CredentialProvider};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Caches tokens from an inner provider per scope
///
/// A cached token is reused until it is within the refresh margin of its
/// expiry. Tokens without a known expiry are never cached.
pub struct CachedCredential<P> {
    inner: P,
    refresh_margin: Duration,
    cache: Mutex<HashMap<String, AccessToken>>,
}

impl<P: CredentialProvider> CachedCredential<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Refresh tokens this long before they expire
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }
}

#[async_trait]
impl<P: CredentialProvider> CredentialProvider for CachedCredential<P> {
    async fn get_token(&self, scope: &str) -> Result<AccessToken, AuthError> {
        // Held across the refresh so concurrent callers wait for one fetch
        let mut cache = self.cache.lock().await;

        if let Some(token) = cache.get(scope) {
            if !token.expires_within(self.refresh_margin) {
                return Ok(token.clone());
            }
            debug!("Cached token for {} is near expiry, refreshing", scope);
        }

        let token = self.inner.get_token(scope).await?;
        if token.expires_at.is_some() {
            cache.insert(scope.to_string(), token.clone());
        } else {
            cache.remove(scope);
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::SystemTime;

    struct CountingCredential {
        calls: AtomicUsize,
        lifetime: Option<Duration>,
        fail: bool,
    }

    impl CountingCredential {
        fn new(lifetime: Option<Duration>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                lifetime,
                fail: false,
            }
        }
    }

    #[async_trait]
    impl CredentialProvider for CountingCredential {
        async fn get_token(&self, _scope: &str) -> Result<AccessToken, AuthError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AuthError::new("no session"));
            }
            let token = AccessToken::new(format!("token-{}", n));
            Ok(match self.lifetime {
                Some(lifetime) => token.with_expiry(SystemTime::now() + lifetime),
                None => token,
            })
        }
    }

    #[tokio::test]
    async fn test_fresh_token_reused() {
        let cached =
            CachedCredential::new(CountingCredential::new(Some(Duration::from_secs(3600))));

        let first = cached.get_token("scope").await.unwrap();
        let second = cached.get_token("scope").await.unwrap();

        assert_eq!(first.token, second.token);
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_token_near_expiry_refreshed() {
        let cached = CachedCredential::new(CountingCredential::new(Some(Duration::from_secs(60))))
            .with_refresh_margin(Duration::from_secs(120));

        let first = cached.get_token("scope").await.unwrap();
        let second = cached.get_token("scope").await.unwrap();

        assert_ne!(first.token, second.token);
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_scopes_cached_separately() {
        let cached =
            CachedCredential::new(CountingCredential::new(Some(Duration::from_secs(3600))));

        cached.get_token("scope-a").await.unwrap();
        cached.get_token("scope-b").await.unwrap();
        cached.get_token("scope-a").await.unwrap();

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_tokens_without_expiry_not_cached() {
        let cached = CachedCredential::new(CountingCredential::new(None));

        cached.get_token("scope").await.unwrap();
        cached.get_token("scope").await.unwrap();

        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_inner_failure_propagates() {
        let mut inner = CountingCredential::new(Some(Duration::from_secs(3600)));
        inner.fail = true;
        let cached = CachedCredential::new(inner);

        let err = cached.get_token("scope").await.unwrap_err();
        assert_eq!(err.message, "no session");
    }
}

use super::{AuthMethodKind, AuthStrategy, IssuedToken};
use crate::client::VaultAuthApi;
use crate::error::AuthError;
use crate::VaultError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct TokenManagerConfig {
    /// A token this close to expiry is refreshed instead of handed out.
    pub safety_margin: Duration,
}

impl Default for TokenManagerConfig {
    fn default() -> Self {
        Self {
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}

/// Caches the token of one [`AuthStrategy`] and logs in again once it expires.
///
/// Every network call happens inside [`TokenManager::get_token`] on the
/// caller's task. Readers of a valid token share a read lock; a refresh holds
/// the write lock across login and TTL lookup, so concurrent callers that all
/// see an expired token produce a single login.
pub struct TokenManager {
    strategy: AuthStrategy,
    client: Arc<dyn VaultAuthApi>,
    token: RwLock<Option<IssuedToken>>,
    config: TokenManagerConfig,
}

impl TokenManager {
    pub fn new(strategy: AuthStrategy, client: Arc<dyn VaultAuthApi>) -> Self {
        Self::with_config(strategy, client, TokenManagerConfig::default())
    }

    pub fn with_config(
        strategy: AuthStrategy,
        client: Arc<dyn VaultAuthApi>,
        config: TokenManagerConfig,
    ) -> Self {
        Self {
            strategy,
            client,
            token: RwLock::new(None),
            config,
        }
    }

    pub fn method(&self) -> AuthMethodKind {
        self.strategy.kind()
    }

    pub fn strategy(&self) -> &AuthStrategy {
        &self.strategy
    }

    pub async fn get_token(&self) -> Result<String, AuthError> {
        if !self.strategy.tracks_expiry() {
            return self.strategy.authenticate(self.client.as_ref()).await;
        }

        {
            let cached = self.token.read().await;
            if let Some(token) = self.usable(&cached) {
                tracing::trace!(method = %self.method(), "Reusing cached Vault token");
                return Ok(token.value().to_string());
            }
        }

        self.refresh().await
    }

    /// Forget the cached token; the next [`get_token`](Self::get_token) logs in.
    pub async fn invalidate(&self) {
        let mut cached = self.token.write().await;
        if cached.take().is_some() {
            tracing::debug!(method = %self.method(), "Cached Vault token invalidated");
        }
    }

    pub async fn expires_at(&self) -> Option<Instant> {
        self.token.read().await.as_ref().map(IssuedToken::expires_at)
    }

    fn usable<'a>(&self, cached: &'a Option<IssuedToken>) -> Option<&'a IssuedToken> {
        cached
            .as_ref()
            .filter(|token| token.is_usable(self.config.safety_margin))
    }

    async fn refresh(&self) -> Result<String, AuthError> {
        let mut cached = self.token.write().await;

        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = self.usable(&cached) {
            return Ok(token.value().to_string());
        }

        let value = self.strategy.authenticate(self.client.as_ref()).await?;
        let obtained_at = Instant::now();
        let lookup = self
            .client
            .lookup_self_ttl(&value, self.strategy.namespace())
            .await;
        let ttl = confirmed_ttl(self.method(), lookup);

        tracing::info!(
            method = %self.method(),
            ttl_secs = ttl.as_secs(),
            "Obtained new Vault token"
        );

        *cached = Some(IssuedToken::new(value.clone(), obtained_at, ttl));
        Ok(value)
    }
}

/// TTL to cache the token with. A failed lookup counts as already expired.
fn confirmed_ttl(method: AuthMethodKind, lookup: Result<Duration, VaultError>) -> Duration {
    match lookup {
        Ok(ttl) => ttl,
        Err(e) => {
            tracing::warn!(
                %method,
                error = %e,
                "Token TTL lookup failed, token will be replaced on next use"
            );
            Duration::ZERO
        }
    }
}

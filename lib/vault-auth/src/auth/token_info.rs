use std::time::Duration;
use tokio::time::Instant;

/// Longest lifetime a token is cached for, whatever TTL Vault reports.
pub const MAX_CACHED_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// A token together with the TTL Vault confirmed for it.
#[derive(Clone)]
pub struct IssuedToken {
    value: String,
    obtained_at: Instant,
    ttl: Duration,
}

impl IssuedToken {
    /// `obtained_at` is the moment the TTL was measured from. `ttl` is capped
    /// at [`MAX_CACHED_TTL`].
    pub fn new(value: String, obtained_at: Instant, ttl: Duration) -> Self {
        Self {
            value,
            obtained_at,
            ttl: ttl.min(MAX_CACHED_TTL),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn obtained_at(&self) -> Instant {
        self.obtained_at
    }

    pub fn expires_at(&self) -> Instant {
        self.obtained_at + self.ttl
    }

    /// Still good for at least `margin` from now.
    pub fn is_usable(&self, margin: Duration) -> bool {
        Instant::now()
            .checked_add(margin)
            .is_some_and(|deadline| deadline < self.expires_at())
    }
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("value", &"[REDACTED]")
            .field("obtained_at", &self.obtained_at)
            .field("ttl", &self.ttl)
            .finish()
    }
}

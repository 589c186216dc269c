use chrono::{DateTime, Duration, Utc};

/// A complete access/refresh token pair with absolute expiry timestamps.
///
/// Pairs are created whole by a token exchange and replaced whole on refresh;
/// there is no partially-populated state.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
    pub scope: String,
    pub token_type: String,
}

impl TokenPair {
    /// A token is valid strictly before its expiry instant (open interval).
    pub fn is_access_token_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.access_token_expires_at
    }

    pub fn is_refresh_token_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.refresh_token_expires_at
    }

    /// Remaining lifetime of the refresh token at `now`. Negative once expired.
    pub fn refresh_token_remaining(&self, now: DateTime<Utc>) -> Duration {
        self.refresh_token_expires_at - now
    }
}

/// In-memory holder for the current token pair.
///
/// Not internally synchronized; the [`Authenticator`](super::Authenticator)
/// mutex is the only writer.
#[derive(Debug, Default)]
pub struct CredentialStore {
    pair: Option<TokenPair>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair(&self) -> Option<&TokenPair> {
        self.pair.as_ref()
    }

    /// Replaces the stored pair wholesale.
    pub fn replace(&mut self, pair: TokenPair) {
        self.pair = Some(pair);
    }

    pub fn is_access_token_valid(&self, now: DateTime<Utc>) -> bool {
        self.pair
            .as_ref()
            .is_some_and(|pair| pair.is_access_token_valid(now))
    }

    pub fn is_refresh_token_valid(&self, now: DateTime<Utc>) -> bool {
        self.pair
            .as_ref()
            .is_some_and(|pair| pair.is_refresh_token_valid(now))
    }
}

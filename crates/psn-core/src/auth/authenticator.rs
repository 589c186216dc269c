use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use super::{AuthError, CredentialStore, TokenExchanger, TokenPair};

/// Coordinates the credential store and token exchanger behind a single
/// "give me a valid access token" entry point.
///
/// The whole check-then-act sequence runs under one mutex guard: refresh
/// tokens are one-time-use, so two callers racing through expiry detection
/// would invalidate one of the freshly-issued pairs.
#[derive(Debug)]
pub struct Authenticator {
    store: Mutex<CredentialStore>,
    exchanger: TokenExchanger,
    npsso: String,
    refresh_warning: Duration,
}

enum TokenPlan {
    Reuse(String),
    Refresh(String),
    Bootstrap,
}

impl Authenticator {
    pub fn new(npsso: impl Into<String>, exchanger: TokenExchanger) -> Self {
        Self {
            store: Mutex::new(CredentialStore::new()),
            exchanger,
            npsso: npsso.into(),
            refresh_warning: Duration::days(3),
        }
    }

    /// Lead time before refresh-token expiry at which a warning is emitted.
    pub fn with_refresh_warning(mut self, window: Duration) -> Self {
        self.refresh_warning = window;
        self
    }

    /// Returns a bearer token valid at the current instant.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        self.access_token_at(Utc::now()).await
    }

    /// Returns a bearer token valid at `now`, exchanging or refreshing as
    /// needed. Exchange failures propagate unmodified; no retries happen
    /// here.
    pub async fn access_token_at(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let mut store = self.store.lock().await;

        let plan = match store.pair() {
            Some(pair) if pair.is_access_token_valid(now) => {
                TokenPlan::Reuse(pair.access_token.clone())
            }
            Some(pair) if pair.is_refresh_token_valid(now) => {
                TokenPlan::Refresh(pair.refresh_token.clone())
            }
            _ => TokenPlan::Bootstrap,
        };

        let token = match plan {
            TokenPlan::Reuse(token) => token,
            TokenPlan::Refresh(refresh_token) => {
                let pair = self.exchanger.exchange_refresh(&refresh_token).await?;
                let token = pair.access_token.clone();
                store.replace(pair);
                token
            }
            TokenPlan::Bootstrap => {
                let pair = self.exchanger.exchange_npsso(&self.npsso).await?;
                let token = pair.access_token.clone();
                store.replace(pair);
                token
            }
        };

        if let Some(pair) = store.pair() {
            self.warn_if_refresh_expiring(pair, now);
        }

        Ok(token)
    }

    /// Returns whether the warning fired.
    fn warn_if_refresh_expiring(&self, pair: &TokenPair, now: DateTime<Utc>) -> bool {
        let remaining = pair.refresh_token_remaining(now);
        if remaining >= self.refresh_warning {
            return false;
        }
        tracing::warn!(
            hours_remaining = remaining.num_hours(),
            "refresh token expires soon; the session will need a new npsso cookie"
        );
        true
    }
}

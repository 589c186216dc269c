use std::time::Duration as StdDuration;

use chrono::Duration;
use rand::seq::SliceRandom;
use rand::thread_rng;
use url::Url;

use crate::auth::exchange::AuthEndpoints;
use crate::http::RateLimit;

const DEFAULT_API_BASE: &str = "https://m.np.playstation.com/api";
const DEFAULT_ACCOUNT_BASE: &str = "https://dms.api.playstation.com/api";

/// Mobile user agents the official app rotates between. A random one is
/// picked per client session.
const MOBILE_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 6.0; Nexus 5 Build/MRA58N) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/55.0.6598.1817 Mobile Safari/537.36",
    "Mozilla/5.0 (Android 14; Mobile; rv:137.0) Gecko/137.0 Firefox/137.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 18_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.5 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 18_3_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.3.1 Mobile/15E148 Safari/604.1",
];

/// Headers attached to every resource request.
#[derive(Debug, Clone)]
pub struct CommonHeaders {
    pub user_agent: String,
    pub accept_language: String,
    pub country: String,
}

impl Default for CommonHeaders {
    fn default() -> Self {
        let user_agent = MOBILE_USER_AGENTS
            .choose(&mut thread_rng())
            .copied()
            .unwrap_or(MOBILE_USER_AGENTS[0]);
        Self {
            user_agent: user_agent.into(),
            accept_language: "en-US,en;q=0.9".into(),
            country: "US".into(),
        }
    }
}

/// Explicit configuration consumed by the client; nothing is read from
/// ambient global state.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Long-lived, single-use login secret obtained from the PSN website.
    pub npsso: String,
    pub headers: CommonHeaders,
    pub rate_limit: RateLimit,
    /// Retries allowed after the first attempt of a resource request.
    pub max_retries: u32,
    /// Base delay for exponential retry backoff.
    pub retry_base_delay: StdDuration,
    pub request_timeout: StdDuration,
    /// Remaining refresh-token lifetime below which a warning is logged.
    pub refresh_warning: Duration,
    /// Overrides the access-token lifetime reported by the wire response.
    pub access_token_ttl_override: Option<Duration>,
    pub auth_endpoints: AuthEndpoints,
    pub api_base_url: Url,
    /// Device-management base; only the own-account lookup lives there.
    pub account_base_url: Url,
}

impl ClientConfig {
    pub fn new(npsso: impl Into<String>) -> Self {
        Self {
            npsso: npsso.into(),
            headers: CommonHeaders::default(),
            rate_limit: RateLimit::default(),
            max_retries: 3,
            retry_base_delay: StdDuration::from_millis(500),
            request_timeout: StdDuration::from_secs(30),
            refresh_warning: Duration::days(3),
            access_token_ttl_override: None,
            auth_endpoints: AuthEndpoints::default(),
            api_base_url: Url::parse(DEFAULT_API_BASE).expect("valid API base URL"),
            account_base_url: Url::parse(DEFAULT_ACCOUNT_BASE).expect("valid account base URL"),
        }
    }

    pub fn with_headers(mut self, headers: CommonHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: StdDuration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: StdDuration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_refresh_warning(mut self, window: Duration) -> Self {
        self.refresh_warning = window;
        self
    }

    pub fn with_access_token_ttl_override(mut self, ttl: Duration) -> Self {
        self.access_token_ttl_override = Some(ttl);
        self
    }

    pub fn with_auth_endpoints(mut self, endpoints: AuthEndpoints) -> Self {
        self.auth_endpoints = endpoints;
        self
    }

    pub fn with_api_base_url(mut self, base: Url) -> Self {
        self.api_base_url = base;
        self
    }

    pub fn with_account_base_url(mut self, base: Url) -> Self {
        self.account_base_url = base;
        self
    }
}

//! Thin typed wrappers over resource endpoints. Everything here reaches the
//! network exclusively through [`RequestEngine`](crate::http::RequestEngine).

mod groups;
mod trophies;
mod users;

pub use groups::{GroupsService, SentMessage};
pub use trophies::{TrophiesService, TrophyCounts, TrophySummary, TrophyTitleSummary};
pub use users::{Avatar, BasicPresence, PlatformInfo, UserProfile, UsersService};

use url::Url;

use crate::http::ApiResult;

/// Joins a path onto the API base without doubling the separator.
pub(crate) fn endpoint(base: &Url, path: &str) -> ApiResult<Url> {
    let joined = format!("{}{}", base.as_str().trim_end_matches('/'), path);
    Ok(Url::parse(&joined)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    use httpmock::prelude::*;
    use url::Url;

    use crate::auth::exchange::{AppCredentials, AuthEndpoints};
    use crate::auth::{Authenticator, TokenExchanger};
    use crate::config::ClientConfig;
    use crate::http::{RateLimit, RateLimiter, RequestEngine};

    /// Engine wired to `server` for both token exchanges and resources.
    pub(crate) fn test_engine(server: &MockServer) -> RequestEngine {
        server.mock(|when, then| {
            when.method(GET).path("/authz/v3/oauth/authorize");
            then.status(302).header(
                "location",
                "com.scee.psxandroid.scecompcall://redirect?code=v3.code",
            );
        });
        server.mock(|when, then| {
            when.method(POST).path("/authz/v3/oauth/token");
            then.status(200).json_body_obj(&serde_json::json!({
                "access_token": "access-1",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh-1",
                "refresh_token_expires_in": 5_184_000,
                "scope": "psn:mobile.v2.core psn:clientapp"
            }));
        });

        let config = ClientConfig::new("npsso")
            .with_retry_base_delay(StdDuration::from_millis(1))
            .with_rate_limit(RateLimit {
                count: 100,
                window: StdDuration::from_millis(100),
            });
        let endpoints = AuthEndpoints {
            authorize_url: Url::parse(&format!("{}/authz/v3/oauth/authorize", server.base_url()))
                .unwrap(),
            token_url: Url::parse(&format!("{}/authz/v3/oauth/token", server.base_url())).unwrap(),
        };
        let exchanger = TokenExchanger::new(endpoints, AppCredentials::default()).unwrap();
        let authenticator = Arc::new(Authenticator::new("npsso", exchanger));
        let limiter = Arc::new(RateLimiter::new(config.rate_limit));
        RequestEngine::new(authenticator, limiter, &config).unwrap()
    }

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let base = Url::parse("http://127.0.0.1:5000").unwrap();
        let url = super::endpoint(&base, "/trophy/v1/users/me/trophySummary").unwrap();
        assert_eq!(url.path(), "/trophy/v1/users/me/trophySummary");

        let base = Url::parse("https://m.np.playstation.com/api").unwrap();
        let url = super::endpoint(&base, "/trophy/v1/users/me/trophySummary").unwrap();
        assert_eq!(
            url.as_str(),
            "https://m.np.playstation.com/api/trophy/v1/users/me/trophySummary"
        );
    }
}

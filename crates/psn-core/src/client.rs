use std::sync::Arc;

use url::Url;

use crate::auth::exchange::AppCredentials;
use crate::auth::{Authenticator, TokenExchanger};
use crate::config::ClientConfig;
use crate::http::{ApiResult, RateLimiter, RequestEngine};
use crate::services::{GroupsService, TrophiesService, UsersService};

/// Top-level handle to the PlayStation Network API.
///
/// One `Psn` owns one authenticated session: the npsso cookie, the token
/// pair it gets exchanged for, and the request budget shared by every
/// service handle created from it.
#[derive(Clone)]
pub struct Psn {
    authenticator: Arc<Authenticator>,
    engine: RequestEngine,
    api_base: Url,
    account_base: Url,
}

impl Psn {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let exchanger = TokenExchanger::new(
            config.auth_endpoints.clone(),
            AppCredentials::default(),
        )?
        .with_access_token_ttl_override(config.access_token_ttl_override);

        let authenticator = Arc::new(
            Authenticator::new(config.npsso.clone(), exchanger)
                .with_refresh_warning(config.refresh_warning),
        );
        let limiter = Arc::new(RateLimiter::new(config.rate_limit));
        let engine = RequestEngine::new(Arc::clone(&authenticator), limiter, &config)?;

        Ok(Self {
            authenticator,
            engine,
            api_base: config.api_base_url,
            account_base: config.account_base_url,
        })
    }

    pub fn users(&self) -> UsersService {
        UsersService::new(
            self.engine.clone(),
            self.api_base.clone(),
            self.account_base.clone(),
        )
    }

    pub fn trophies(&self) -> TrophiesService {
        TrophiesService::new(self.engine.clone(), self.api_base.clone())
    }

    pub fn groups(&self) -> GroupsService {
        GroupsService::new(self.engine.clone(), self.api_base.clone())
    }

    /// Raw request access for resources without a dedicated service.
    pub fn engine(&self) -> &RequestEngine {
        &self.engine
    }

    pub fn authenticator(&self) -> &Arc<Authenticator> {
        &self.authenticator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::exchange::AuthEndpoints;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn client_wires_auth_and_services_together() {
        let server = MockServer::start();
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
        let summary_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/trophy/v1/users/me/trophySummary")
                .header("authorization", "Bearer access-1");
            then.status(200).json_body_obj(&serde_json::json!({
                "trophyLevel": 42,
                "progress": 10,
                "tier": 2,
                "earnedTrophies": {"bronze": 1, "silver": 0, "gold": 0, "platinum": 0}
            }));
        });

        let config = ClientConfig::new("npsso")
            .with_auth_endpoints(AuthEndpoints {
                authorize_url: Url::parse(&format!(
                    "{}/authz/v3/oauth/authorize",
                    server.base_url()
                ))
                .unwrap(),
                token_url: Url::parse(&format!("{}/authz/v3/oauth/token", server.base_url()))
                    .unwrap(),
            })
            .with_api_base_url(Url::parse(&server.base_url()).unwrap());

        let psn = Psn::new(config).unwrap();
        let summary = psn.trophies().trophy_summary("me").await.unwrap();
        summary_mock.assert();
        assert_eq!(summary.trophy_level, 42);
    }
}

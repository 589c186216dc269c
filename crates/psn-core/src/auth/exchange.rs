use std::time::Duration as StdDuration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{AUTHORIZATION, COOKIE, LOCATION};
use reqwest::{redirect, Client};
use serde::Deserialize;
use url::Url;

use super::utils::correlation_id;
use super::{AuthError, TokenPair};

/// Client id/secret pair registered for the PlayStation mobile app.
pub const DEFAULT_CLIENT_ID: &str = "09515159-7237-4370-9b40-3806e67c0891";
pub const DEFAULT_CLIENT_SECRET: &str = "ucPjka5tntB2KqsP";
pub const DEFAULT_SCOPE: &str = "psn:mobile.v2.core psn:clientapp";
pub const DEFAULT_REDIRECT_URI: &str = "com.scee.psxandroid.scecompcall://redirect";

const TOKEN_USER_AGENT: &str = "com.sony.snei.np.android.sso.share.oauth.versa.USER_AGENT";
const EXCHANGE_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Error code Sony returns when an npsso cookie is stale or malformed.
const NPSSO_EXPIRED_CODE: &str = "4165";

/// Authorization endpoints used for token exchanges.
#[derive(Debug, Clone)]
pub struct AuthEndpoints {
    pub authorize_url: Url,
    pub token_url: Url,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: Url::parse("https://ca.account.sony.com/api/authz/v3/oauth/authorize")
                .expect("valid authorize URL"),
            token_url: Url::parse("https://ca.account.sony.com/api/authz/v3/oauth/token")
                .expect("valid token URL"),
        }
    }
}

/// Application identity presented to the authorization server.
#[derive(Debug, Clone)]
pub struct AppCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub redirect_uri: String,
}

impl Default for AppCredentials {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.into(),
            client_secret: DEFAULT_CLIENT_SECRET.into(),
            scope: DEFAULT_SCOPE.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.into(),
        }
    }
}

/// Performs the two token-acquisition protocols against the authorization
/// endpoint: initial exchange of an npsso cookie and refresh-token exchange.
///
/// Both operations consume a one-time-use credential on the server side, so a
/// failure here is surfaced as-is and never retried.
#[derive(Debug, Clone)]
pub struct TokenExchanger {
    http: Client,
    endpoints: AuthEndpoints,
    app: AppCredentials,
    basic_auth: String,
    cid: String,
    access_token_ttl_override: Option<Duration>,
}

impl TokenExchanger {
    pub fn new(endpoints: AuthEndpoints, app: AppCredentials) -> Result<Self, AuthError> {
        // The authorize endpoint answers with a redirect into a custom app
        // scheme; the code lives in the location header, so never follow it.
        let http = Client::builder()
            .user_agent(TOKEN_USER_AGENT)
            .redirect(redirect::Policy::none())
            .build()?;
        let basic_auth = format!(
            "Basic {}",
            BASE64.encode(format!("{}:{}", app.client_id, app.client_secret))
        );
        Ok(Self {
            http,
            endpoints,
            app,
            basic_auth,
            cid: correlation_id(),
            access_token_ttl_override: None,
        })
    }

    pub fn with_access_token_ttl_override(mut self, ttl: Option<Duration>) -> Self {
        self.access_token_ttl_override = ttl;
        self
    }

    pub fn endpoints(&self) -> &AuthEndpoints {
        &self.endpoints
    }

    /// Exchanges the long-lived npsso cookie for a fresh token pair.
    ///
    /// The cookie is invalidated by the server even when the exchange fails.
    pub async fn exchange_npsso(&self, npsso: &str) -> Result<TokenPair, AuthError> {
        let code = self.authorization_code(npsso).await?;
        tracing::debug!("exchanging authorization code for a token pair");

        let form = [
            ("cid", self.cid.as_str()),
            ("code", code.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.app.redirect_uri.as_str()),
            ("scope", self.app.scope.as_str()),
            ("token_format", "jwt"),
        ];
        let response = self
            .http
            .post(self.endpoints.token_url.clone())
            .header(AUTHORIZATION, &self.basic_auth)
            .header("X-Psn-Correlation-Id", &self.cid)
            .form(&form)
            .timeout(EXCHANGE_TIMEOUT)
            .send()
            .await?;

        self.handle_token_response(response).await
    }

    /// Obtains a new token pair from a refresh token.
    ///
    /// Rejection is terminal for the session; the caller must re-bootstrap
    /// with a new npsso cookie.
    pub async fn exchange_refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        tracing::debug!("refreshing access token");

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("scope", self.app.scope.as_str()),
            ("token_format", "jwt"),
        ];
        let response = self
            .http
            .post(self.endpoints.token_url.clone())
            .header(AUTHORIZATION, &self.basic_auth)
            .form(&form)
            .timeout(EXCHANGE_TIMEOUT)
            .send()
            .await?;

        self.handle_token_response(response).await
    }

    /// Trades the npsso cookie for a one-time authorization code by reading
    /// the redirect the authorize endpoint answers with.
    async fn authorization_code(&self, npsso: &str) -> Result<String, AuthError> {
        let mut url = self.endpoints.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("access_type", "offline")
            .append_pair("cid", &self.cid)
            .append_pair("client_id", &self.app.client_id)
            .append_pair("device_profile", "mobile")
            .append_pair("no_captcha", "true")
            .append_pair("redirect_uri", &self.app.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.app.scope)
            .append_pair("service_entity", "urn:service-entity:psn")
            .append_pair("smcid", "psapp:signin");

        let response = self
            .http
            .get(url)
            .header(COOKIE, format!("npsso={npsso}"))
            .timeout(EXCHANGE_TIMEOUT)
            .send()
            .await?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingRedirect)?;
        let redirect = Url::parse(location)?;

        let mut code = None;
        let mut error = None;
        let mut error_code = None;
        for (key, value) in redirect.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                "error_code" => error_code = Some(value.into_owned()),
                _ => {}
            }
        }

        if let Some(reason) = error {
            if error_code
                .as_deref()
                .is_some_and(|value| value.contains(NPSSO_EXPIRED_CODE))
            {
                return Err(AuthError::NpssoRejected);
            }
            return Err(AuthError::AuthorizationDenied(reason));
        }

        code.ok_or(AuthError::MissingAuthorizationCode)
    }

    async fn handle_token_response(
        &self,
        response: reqwest::Response,
    ) -> Result<TokenPair, AuthError> {
        let status = response.status();
        let received_at = Utc::now();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "".into());
            return Err(AuthError::TokenEndpoint { status, body });
        }

        let payload: TokenResponse = response.json().await?;
        Ok(payload.into_pair(received_at, self.access_token_ttl_override))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: String,
    refresh_token_expires_in: i64,
    scope: Option<String>,
    token_type: Option<String>,
}

impl TokenResponse {
    fn into_pair(self, received_at: DateTime<Utc>, ttl_override: Option<Duration>) -> TokenPair {
        let access_ttl = ttl_override.unwrap_or_else(|| Duration::seconds(self.expires_in));
        TokenPair {
            access_token: self.access_token,
            access_token_expires_at: received_at + access_ttl,
            refresh_token: self.refresh_token,
            refresh_token_expires_at: received_at + Duration::seconds(self.refresh_token_expires_in),
            scope: self.scope.unwrap_or_default(),
            token_type: self.token_type.unwrap_or_else(|| "bearer".into()),
        }
    }
}

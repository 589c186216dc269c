use serde::Deserialize;
use url::Url;

use crate::http::{ApiResult, RequestEngine};

/// Profile and presence lookups for a PSN account.
///
/// Pass `"me"` as the account id to target the authenticated user.
#[derive(Debug, Clone)]
pub struct UsersService {
    engine: RequestEngine,
    base: Url,
    account_base: Url,
}

impl UsersService {
    pub fn new(engine: RequestEngine, base: Url, account_base: Url) -> Self {
        Self {
            engine,
            base,
            account_base,
        }
    }

    /// Account id of the authenticated user, resolved through the
    /// device-management endpoint.
    pub async fn me(&self) -> ApiResult<String> {
        let url = super::endpoint(&self.account_base, "/v1/devices/accounts/me")?;
        let account: AccountEnvelope = self.engine.get_json(url, &[]).await?;
        Ok(account.account_id)
    }

    pub async fn profile(&self, account_id: &str) -> ApiResult<UserProfile> {
        let url = super::endpoint(
            &self.base,
            &format!("/userProfile/v1/internal/users/{account_id}/profiles"),
        )?;
        self.engine.get_json(url, &[]).await
    }

    pub async fn basic_presence(&self, account_id: &str) -> ApiResult<BasicPresence> {
        let url = super::endpoint(
            &self.base,
            &format!("/userProfile/v1/internal/users/{account_id}/basicPresences"),
        )?;
        let envelope: PresenceEnvelope = self
            .engine
            .get_json(url, &[("type", "primary".into())])
            .await?;
        Ok(envelope.basic_presence)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub online_id: String,
    #[serde(default)]
    pub about_me: Option<String>,
    #[serde(default)]
    pub avatars: Vec<Avatar>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub is_plus: bool,
    #[serde(default)]
    pub is_officially_verified: bool,
    #[serde(default)]
    pub is_me: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    pub size: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountEnvelope {
    account_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresenceEnvelope {
    basic_presence: BasicPresence,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicPresence {
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub primary_platform_info: Option<PlatformInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformInfo {
    #[serde(default)]
    pub online_status: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub last_online_date: Option<String>,
}

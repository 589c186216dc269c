use serde::Deserialize;
use url::Url;

use crate::http::{ApiResult, RequestEngine};

/// Text messaging within gaming-lounge groups. Only plain text messages are
/// supported; the real-time transport is out of scope.
#[derive(Debug, Clone)]
pub struct GroupsService {
    engine: RequestEngine,
    base: Url,
}

impl GroupsService {
    pub fn new(engine: RequestEngine, base: Url) -> Self {
        Self { engine, base }
    }

    pub async fn send_message(&self, group_id: &str, message: &str) -> ApiResult<SentMessage> {
        let url = super::endpoint(
            &self.base,
            &format!("/gamingLoungeGroups/v1/groups/{group_id}/threads/{group_id}/messages"),
        )?;
        // messageType 1 is plain text.
        let body = serde_json::json!({ "messageType": 1, "body": message });
        let value = self.engine.post(url, &body).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn leave(&self, group_id: &str) -> ApiResult<()> {
        let url = super::endpoint(
            &self.base,
            &format!("/gamingLoungeGroups/v1/groups/{group_id}/members/me"),
        )?;
        self.engine.delete(url).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub message_uid: String,
    #[serde(default)]
    pub created_timestamp: Option<String>,
}

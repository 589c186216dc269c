use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use crate::http::{ApiResult, RequestEngine};
use crate::pagination::{Page, Paginator};

/// Trophy summaries and per-title trophy listings.
#[derive(Debug, Clone)]
pub struct TrophiesService {
    engine: RequestEngine,
    base: Url,
}

impl TrophiesService {
    pub fn new(engine: RequestEngine, base: Url) -> Self {
        Self { engine, base }
    }

    pub async fn trophy_summary(&self, account_id: &str) -> ApiResult<TrophySummary> {
        let url = super::endpoint(
            &self.base,
            &format!("/trophy/v1/users/{account_id}/trophySummary"),
        )?;
        self.engine.get_json(url, &[]).await
    }

    /// Lazily iterates every trophy title on the account, one page of
    /// `page_size` at a time.
    pub fn trophy_titles(
        &self,
        account_id: &str,
        page_size: u64,
    ) -> ApiResult<Paginator<TrophyTitleSummary>> {
        let url = super::endpoint(
            &self.base,
            &format!("/trophy/v1/users/{account_id}/trophyTitles"),
        )?;
        let engine = self.engine.clone();
        Ok(Paginator::new(page_size, move |offset, limit| {
            let engine = engine.clone();
            let url = url.clone();
            async move {
                let query = [
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ];
                let value = engine.get(url, &query).await?;
                Page::from_value(&value, "trophyTitles")
            }
        }))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TrophyCounts {
    pub bronze: u32,
    pub silver: u32,
    pub gold: u32,
    pub platinum: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrophySummary {
    pub trophy_level: u32,
    pub progress: u32,
    pub tier: u32,
    #[serde(default)]
    pub earned_trophies: TrophyCounts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrophyTitleSummary {
    pub np_communication_id: String,
    #[serde(default)]
    pub np_service_name: Option<String>,
    pub title_name: String,
    #[serde(default)]
    pub title_platform: Option<String>,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub hidden_flag: bool,
    #[serde(default)]
    pub earned_trophies: TrophyCounts,
    #[serde(default)]
    pub defined_trophies: TrophyCounts,
    #[serde(default)]
    pub last_updated_date_time: Option<DateTime<Utc>>,
}

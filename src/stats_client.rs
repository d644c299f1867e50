use crate::models::PerformanceSummary;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("statistics API responded with {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("statistics API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("statistics API base url {0:?} cannot take path segments")]
    BaseUrl(String),
}

/// Client for the third-party athlete statistics API. Every request carries
/// the static key both as the `apikey` header and as a bearer token.
#[derive(Debug, Clone)]
pub struct StatsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StatsClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    // Each segment is percent-encoded on its own, so ids cannot add path levels.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StatsError> {
        let invalid = || StatsError::BaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Value, StatsError> {
        let response = self
            .client
            .get(self.endpoint(segments)?)
            .query(query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .ok()
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(StatsError::Status { status, message });
        }

        Ok(response.json().await?)
    }

    /// Full athlete listing, or `None` when the API cannot be read.
    pub async fn fetch_athletes(&self) -> Option<Value> {
        self.get_json(&["athletes"], &[])
            .await
            .inspect_err(|err| warn!("failed to fetch athletes: {err}"))
            .ok()
    }

    /// Statistics for one athlete, or `None` on any failure.
    pub async fn fetch_athlete_statistics(&self, athlete_id: &str) -> Option<Value> {
        self.get_json(&["athleteStatistics"], &[("athlete_id", athlete_id.to_string())])
            .await
            .inspect_err(|err| warn!(athlete_id, "failed to fetch athlete statistics: {err}"))
            .ok()
    }

    pub async fn athlete_info(&self, athlete_id: &str) -> Result<Value, StatsError> {
        self.get_json(&["athletes", athlete_id], &[]).await
    }

    pub async fn athlete_results(
        &self,
        athlete_id: &str,
        per_page: u32,
        elite: bool,
    ) -> Result<Value, StatsError> {
        self.get_json(
            &["athletes", athlete_id, "results"],
            &[("per_page", per_page.to_string()), ("elite", elite.to_string())],
        )
        .await
    }

    pub async fn athlete_rankings(&self, athlete_id: &str) -> Result<Value, StatsError> {
        self.get_json(&["athletes", athlete_id, "rankings"], &[]).await
    }

    pub async fn athlete_categories(&self) -> Result<Value, StatsError> {
        self.get_json(&["athletes", "categories"], &[]).await
    }
}

impl PerformanceSummary {
    /// Reads race counters from a statistics payload's `data` object; absent
    /// or non-numeric counters are zero.
    pub fn from_statistics(payload: &Value) -> Self {
        let data = payload.get("data");
        let counter = |name: &str| {
            data.and_then(|data| data.get(name))
                .and_then(Value::as_u64)
                .unwrap_or(0)
        };
        Self {
            race_starts: counter("race_starts"),
            race_finishes: counter("race_finishes"),
            race_wins: counter("race_wins"),
            race_podiums: counter("race_podiums"),
        }
    }
}

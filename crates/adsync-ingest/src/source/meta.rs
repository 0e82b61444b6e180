//! Meta Marketing API insights client.
//!
//! Talks to the Graph API `/{account}/insights` edge and follows
//! `paging.next` until a window is exhausted. Range fetches are chunked
//! into sub-windows (see [`date_windows`]) processed sequentially with a
//! short pause between provider calls.

use super::{date_windows, FetchBatch, InsightSource, INSIGHT_FIELDS};
use crate::config::MetaConfig;
use crate::error::{Error, Result};
use adsync_core::RawInsight;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

/// Page size for single-day (daily mode) requests.
const DAILY_PAGE_LIMIT: &str = "500";
/// Page size for historical range requests.
const RANGE_PAGE_LIMIT: &str = "1000";
/// Pause between sub-window requests, to stay friendly with rate limits.
const WINDOW_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
struct InsightsPage {
    #[serde(default)]
    data: Vec<RawInsight>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: i64,
}

/// Graph API insights client for one access token.
pub struct MetaInsights {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
    access_token: String,
}

impl MetaInsights {
    /// Create a client for the given token.
    ///
    /// Tokens are per account (with a shared fallback), so the pipeline
    /// constructs one client per account it processes.
    pub fn new(config: &MetaConfig, access_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            access_token: access_token.to_string(),
        }
    }

    fn insights_url(&self, account_id: &str) -> String {
        format!(
            "{}/{}/{}/insights",
            self.base_url, self.api_version, account_id
        )
    }

    /// Fetch one provider window, following pagination to the end.
    async fn fetch_paged(
        &self,
        account_id: &str,
        extra_params: &[(&str, String)],
        limit: &str,
    ) -> Result<Vec<RawInsight>> {
        let mut params: Vec<(&str, String)> = vec![
            ("level", "ad".to_string()),
            ("fields", INSIGHT_FIELDS.join(",")),
            ("limit", limit.to_string()),
            ("access_token", self.access_token.clone()),
        ];
        params.extend(extra_params.iter().cloned());

        let mut records = Vec::new();
        let mut request = self.http.get(self.insights_url(account_id)).query(&params);

        loop {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GraphErrorBody>(&body)
                    .map(|e| format!("code {}: {}", e.error.code, e.error.message))
                    .unwrap_or(body);
                return Err(Error::Source(format!("status {status}: {message}")));
            }

            let page: InsightsPage = response.json().await?;
            records.extend(page.data);

            // `paging.next` is a complete URL carrying all parameters.
            match page.paging.and_then(|p| p.next) {
                Some(next) => request = self.http.get(next),
                None => break,
            }
        }

        Ok(records)
    }
}

impl InsightSource for MetaInsights {
    fn name(&self) -> &'static str {
        "meta-insights"
    }

    async fn fetch_yesterday(&self, account_id: &str) -> Result<Vec<RawInsight>> {
        self.fetch_paged(
            account_id,
            &[("date_preset", "yesterday".to_string())],
            DAILY_PAGE_LIMIT,
        )
        .await
    }

    async fn fetch_range(
        &self,
        account_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchBatch> {
        let windows = date_windows(start, end);
        let mut batch = FetchBatch {
            windows_total: windows.len(),
            ..Default::default()
        };

        tracing::info!(
            account_id,
            %start,
            %end,
            windows = windows.len(),
            "fetching historical insights"
        );

        for (index, (since, until)) in windows.iter().enumerate() {
            let time_range = serde_json::json!({
                "since": since.format("%Y-%m-%d").to_string(),
                "until": until.format("%Y-%m-%d").to_string(),
            })
            .to_string();
            let params = [
                ("time_range", time_range),
                ("time_increment", "1".to_string()),
            ];

            match self.fetch_paged(account_id, &params, RANGE_PAGE_LIMIT).await {
                Ok(records) => {
                    tracing::debug!(account_id, %since, %until, records = records.len(), "window fetched");
                    batch.records.extend(records);
                }
                Err(e) => {
                    // Partial-result tolerance: a bad window never fails the range.
                    batch.windows_failed += 1;
                    tracing::warn!(account_id, %since, %until, error = %e, "window fetch failed, skipping");
                }
            }

            if index + 1 < windows.len() {
                tokio::time::sleep(WINDOW_PAUSE).await;
            }
        }

        Ok(batch)
    }
}

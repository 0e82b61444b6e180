//! Google Sheets mirror backend.
//!
//! Talks to the Sheets `values` REST endpoints with a bearer token.
//! Writes use `USER_ENTERED` input so date and number cells keep their
//! spreadsheet types. A missing tab surfaces as
//! [`Error::MirrorNotFound`] — the Sheets API rejects the range parse with
//! a 400 when the tab does not exist.

use super::mirror::Mirror;
use crate::config::SheetsConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";
/// Rightmost column of the mirror's 8-cell rows.
const LAST_COLUMN: char = 'H';

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct UpdateBody<'a> {
    range: String,
    #[serde(rename = "majorDimension")]
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

/// Sheets-backed [`Mirror`] for one spreadsheet document.
pub struct SheetsMirror {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    token: String,
}

impl SheetsMirror {
    pub fn new(config: &SheetsConfig) -> Self {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Point the client at a different endpoint (tests).
    pub fn with_base_url(config: &SheetsConfig, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            token: config.token.clone(),
        }
    }

    fn values_url(&self, suffix: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, suffix
        )
    }

    /// Map an error response, treating range-parse failures as a missing tab.
    async fn fail(tab: &str, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        if status == 404 || (status == 400 && body.contains("Unable to parse range")) {
            Error::MirrorNotFound {
                tab: tab.to_string(),
            }
        } else {
            Error::Sheets { status, body }
        }
    }

    async fn get_range(&self, tab: &str, range: &str, columns: bool) -> Result<Vec<Vec<String>>> {
        let mut request = self.http.get(self.values_url(range)).bearer_auth(&self.token);
        if columns {
            request = request.query(&[("majorDimension", "COLUMNS")]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::fail(tab, response).await);
        }

        let range: ValueRange = response.json().await?;
        Ok(range.values)
    }
}

impl Mirror for SheetsMirror {
    async fn col_values(&self, tab: &str) -> Result<Vec<String>> {
        let range = format!("{tab}!A:A");
        let mut values = self.get_range(tab, &range, true).await?;
        Ok(if values.is_empty() {
            Vec::new()
        } else {
            values.swap_remove(0)
        })
    }

    async fn all_values(&self, tab: &str) -> Result<Vec<Vec<String>>> {
        self.get_range(tab, tab, false).await
    }

    async fn update_rows(&self, tab: &str, start_row: usize, rows: &[Vec<String>]) -> Result<()> {
        let end_row = start_row + rows.len().saturating_sub(1);
        let range = format!("{tab}!A{start_row}:{LAST_COLUMN}{end_row}");

        let response = self
            .http
            .put(self.values_url(&range))
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&UpdateBody {
                range: range.clone(),
                major_dimension: "ROWS",
                values: rows,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::fail(tab, response).await);
        }
        tracing::debug!(tab, range = %range, rows = rows.len(), "mirror range updated");
        Ok(())
    }

    async fn clear_rows(&self, tab: &str, from_row: usize, to_row: usize) -> Result<()> {
        let range = format!("{tab}!A{from_row}:{LAST_COLUMN}{to_row}");
        let url = format!("{}:clear", self.values_url(&range));

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&json!({}))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::fail(tab, response).await);
        }
        tracing::debug!(tab, range = %range, "mirror range cleared");
        Ok(())
    }
}

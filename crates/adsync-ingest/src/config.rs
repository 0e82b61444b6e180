//! Pipeline configuration loaded from a TOML file.
//!
//! A single immutable [`Config`] value is loaded at startup and threaded
//! into each component's constructor. Nothing in the pipeline reads
//! ambient global state.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub clickhouse: ClickHouseConfig,
    pub sheets: SheetsConfig,
    pub meta: MetaConfig,
    /// Ad accounts to process, in order, one at a time.
    pub accounts: Vec<AccountConfig>,
}

/// Warehouse connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ClickHouseConfig {
    /// Server URL (e.g., "http://localhost:8123").
    #[serde(default = "default_clickhouse_url")]
    pub url: String,
    /// Database holding the per-account fact tables.
    pub database: String,
}

/// Mirror spreadsheet settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet document id (the long id from the sheet URL).
    pub spreadsheet_id: String,
    /// OAuth bearer token with spreadsheet scope.
    pub token: String,
}

/// Insights API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MetaConfig {
    /// Shared access token used by accounts without an override.
    pub access_token: String,
    /// Graph API base URL. Overridable for tests.
    #[serde(default = "default_graph_url")]
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

/// One ad account feeding the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    /// Human-readable account name, used in logs.
    pub name: String,
    /// Provider account id (e.g., "act_1234567890").
    pub account_id: String,
    /// Destination fact table in the warehouse.
    pub table: String,
    /// Per-account token override; falls back to `meta.access_token`.
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_clickhouse_url() -> String {
    "http://localhost:8123".to_string()
}

fn default_graph_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_api_version() -> String {
    "v19.0".to_string()
}

impl Config {
    /// Load and validate configuration from a TOML file.
    ///
    /// This is the only failure in the pipeline that aborts the process.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&text)?;
        config.validate()?;

        tracing::info!(
            clickhouse_url = %config.clickhouse.url,
            database = %config.clickhouse.database,
            accounts = config.accounts.len(),
            "configuration loaded"
        );

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.accounts.is_empty() {
            return Err(Error::Config("no ad accounts configured".to_string()));
        }
        for account in &self.accounts {
            if account.account_id.is_empty() || account.table.is_empty() {
                return Err(Error::Config(format!(
                    "account '{}' is missing an account_id or table",
                    account.name
                )));
            }
        }
        if self.clickhouse.database.is_empty() {
            return Err(Error::Config("clickhouse.database is empty".to_string()));
        }
        Ok(())
    }

    /// The access token to use for a given account.
    pub fn token_for<'a>(&'a self, account: &'a AccountConfig) -> &'a str {
        account
            .access_token
            .as_deref()
            .unwrap_or(&self.meta.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [clickhouse]
        database = "ads"

        [sheets]
        spreadsheet_id = "1AbC"
        token = "ya29.sheet-token"

        [meta]
        access_token = "shared-token"

        [[accounts]]
        name = "clinic_beauty"
        account_id = "act_111"
        table = "meta_ads_beauty"

        [[accounts]]
        name = "clinic_foot"
        account_id = "act_222"
        table = "meta_ads_foot"
        access_token = "foot-token"
    "#;

    #[test]
    fn parses_sample_config() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        config.validate().unwrap();
        assert_eq!(config.clickhouse.url, "http://localhost:8123");
        assert_eq!(config.meta.base_url, "https://graph.facebook.com");
        assert_eq!(config.meta.api_version, "v19.0");
        assert_eq!(config.accounts.len(), 2);
    }

    #[test]
    fn token_override_falls_back_to_shared() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.token_for(&config.accounts[0]), "shared-token");
        assert_eq!(config.token_for(&config.accounts[1]), "foot-token");
    }

    #[test]
    fn rejects_empty_account_list() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.accounts.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_account_without_table() {
        let text = SAMPLE.replace("table = \"meta_ads_beauty\"", "table = \"\"");
        let config: Config = toml::from_str(&text).unwrap();
        assert!(config.validate().is_err());
    }
}

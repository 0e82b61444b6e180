//! ClickHouse-backed fact store.
//!
//! Each ad account lands in its own MergeTree table inside one database.
//! The table is partitioned by report month and ordered by
//! `(report_date, campaign_name)`, matching the pipeline's read pattern
//! (the mirror appender scans a date suffix of the table).
//!
//! # Atomic rewrite
//!
//! [`FactStore::replace_all`] never mutates the live table in place. Rows
//! are staged into a `<table>_rewrite` sibling, then swapped in with
//! `EXCHANGE TABLES` (atomic under the default Atomic database engine).
//! Any failure before the swap leaves the live table untouched; the staging
//! table is dropped on both success and failure.

use super::FactStore;
use crate::config::ClickHouseConfig;
use crate::error::Result;
use adsync_core::FactRecord;
use chrono::{DateTime, NaiveDate, Utc};
use clickhouse::{Client, Row};
use serde::{Deserialize, Serialize};

/// Row structure matching the per-account fact tables.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
struct FactRow {
    campaign_name: String,
    ad_name: String,
    ad_id: String,
    exposures: u64,
    clicks: u64,
    leads: u64,
    result_type: String,
    spend: f64,
    #[serde(with = "clickhouse::serde::chrono::date")]
    report_date: NaiveDate,
    #[serde(with = "clickhouse::serde::chrono::datetime64::millis")]
    collected_at: DateTime<Utc>,
    channel: String,
}

impl From<&FactRecord> for FactRow {
    fn from(record: &FactRecord) -> Self {
        Self {
            campaign_name: record.campaign_name.clone(),
            ad_name: record.ad_name.clone(),
            ad_id: record.ad_id.clone(),
            exposures: record.exposures,
            clicks: record.clicks,
            leads: record.leads,
            result_type: record.result_type.clone(),
            spend: record.spend,
            report_date: record.report_date,
            collected_at: record.collected_at,
            channel: record.channel.clone(),
        }
    }
}

impl From<FactRow> for FactRecord {
    fn from(row: FactRow) -> Self {
        Self {
            campaign_name: row.campaign_name,
            ad_name: row.ad_name,
            ad_id: row.ad_id,
            exposures: row.exposures,
            clicks: row.clicks,
            leads: row.leads,
            result_type: row.result_type,
            spend: row.spend,
            report_date: row.report_date,
            collected_at: row.collected_at,
            channel: row.channel,
        }
    }
}

const SELECT_COLUMNS: &str = "campaign_name, ad_name, ad_id, exposures, clicks, leads, \
     result_type, spend, report_date, collected_at, channel";

/// ClickHouse warehouse holding the per-account fact tables.
#[derive(Clone)]
pub struct Warehouse {
    client: Client,
}

impl Warehouse {
    /// Connect to the warehouse described by the configuration.
    pub fn new(config: &ClickHouseConfig) -> Self {
        let client = Client::default()
            .with_url(&config.url)
            .with_database(&config.database);

        tracing::info!(url = %config.url, database = %config.database, "warehouse client initialized");

        Self { client }
    }

    /// Create the fact table if it does not exist yet.
    ///
    /// Idempotent; called once per account before the first append.
    pub async fn ensure_table(&self, table: &str) -> Result<()> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {table} (\
                 campaign_name String, \
                 ad_name String, \
                 ad_id String, \
                 exposures UInt64, \
                 clicks UInt64, \
                 leads UInt64, \
                 result_type String, \
                 spend Float64, \
                 report_date Date, \
                 collected_at DateTime64(3), \
                 channel String\
             ) ENGINE = MergeTree \
             PARTITION BY toYYYYMM(report_date) \
             ORDER BY (report_date, campaign_name)"
        );
        self.client.query(&ddl).execute().await?;
        Ok(())
    }

    /// Check that the server is reachable.
    pub async fn health_check(&self) -> Result<bool> {
        let result: u8 = self.client.query("SELECT 1").fetch_one().await?;
        Ok(result == 1)
    }

    async fn insert_rows(&self, table: &str, rows: &[FactRecord]) -> Result<()> {
        let mut inserter = self.client.insert(table)?;
        for record in rows {
            inserter.write(&FactRow::from(record)).await?;
        }
        inserter.end().await?;
        Ok(())
    }
}

impl FactStore for Warehouse {
    async fn append(&self, table: &str, rows: &[FactRecord]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.insert_rows(table, rows).await?;
        tracing::debug!(table, rows = rows.len(), "appended fact rows");
        Ok(())
    }

    async fn fetch_all(&self, table: &str) -> Result<Vec<FactRecord>> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM {table} \
             ORDER BY report_date ASC, campaign_name ASC"
        );
        let rows = self.client.query(&query).fetch_all::<FactRow>().await?;
        Ok(rows.into_iter().map(FactRecord::from).collect())
    }

    async fn fetch_since(&self, table: &str, since: NaiveDate) -> Result<Vec<FactRecord>> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM {table} \
             WHERE report_date >= toDate(?) \
             ORDER BY report_date ASC, campaign_name ASC"
        );
        let rows = self
            .client
            .query(&query)
            .bind(since.format("%Y-%m-%d").to_string())
            .fetch_all::<FactRow>()
            .await?;
        Ok(rows.into_iter().map(FactRecord::from).collect())
    }

    async fn replace_all(&self, table: &str, rows: Vec<FactRecord>) -> Result<()> {
        let staging = format!("{table}_rewrite");

        // Fresh staging table with the live table's structure.
        self.client
            .query(&format!("DROP TABLE IF EXISTS {staging}"))
            .execute()
            .await?;
        self.client
            .query(&format!("CREATE TABLE {staging} AS {table}"))
            .execute()
            .await?;

        let staged = async {
            self.insert_rows(&staging, &rows).await?;
            self.client
                .query(&format!("EXCHANGE TABLES {staging} AND {table}"))
                .execute()
                .await
                .map_err(crate::error::Error::from)
        }
        .await;

        // The staging table holds the old contents after a successful swap,
        // or partial rows after a failure; drop it either way.
        let cleanup = self
            .client
            .query(&format!("DROP TABLE IF EXISTS {staging}"))
            .execute()
            .await;
        if let Err(e) = cleanup {
            tracing::warn!(table, error = %e, "failed to drop staging table");
        }

        staged?;
        tracing::debug!(table, rows = rows.len(), "table contents replaced");
        Ok(())
    }
}

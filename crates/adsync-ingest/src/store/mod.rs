//! Append store backends for fact records.
//!
//! The warehouse is append-only in the ingestion path: `append` never checks
//! for duplicates, and the only delete is the recency reconciler's atomic
//! full-table rewrite via [`FactStore::replace_all`].
//!
//! Two implementations:
//! - [`Warehouse`] - ClickHouse, the production backend
//! - [`MemoryStore`] - in-memory fake for exercising the reconciler and
//!   mirror sync without a server

mod clickhouse;
mod memory;

pub use self::clickhouse::Warehouse;
pub use memory::MemoryStore;

use crate::error::Result;
use adsync_core::FactRecord;
use chrono::NaiveDate;

/// A durable, queryable table of fact records, loosely keyed by natural key.
#[allow(async_fn_in_trait)]
pub trait FactStore {
    /// Append rows without any duplicate checking.
    async fn append(&self, table: &str, rows: &[FactRecord]) -> Result<()>;

    /// All rows in the table, in `(report_date, campaign_name)` order.
    async fn fetch_all(&self, table: &str) -> Result<Vec<FactRecord>>;

    /// Rows with `report_date >= since`, in `(report_date, campaign_name)`
    /// order.
    async fn fetch_since(&self, table: &str, since: NaiveDate) -> Result<Vec<FactRecord>>;

    /// Atomically replace the table's full contents.
    ///
    /// All-or-nothing: on failure the original table must remain unchanged,
    /// and no reader may observe a partially-rewritten table.
    async fn replace_all(&self, table: &str, rows: Vec<FactRecord>) -> Result<()>;
}

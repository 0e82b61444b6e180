//! Per-account pipeline orchestration.
//!
//! One account runs strictly sequentially through four stages:
//!
//! ```text
//! fetch → normalize → append     (warehouse write)
//! recency reconcile              (warehouse cleanup, best-effort)
//! mirror append                  (watermark-driven sheet sync)
//! mirror reconcile               (sheet cleanup, best-effort)
//! ```
//!
//! Every stage is idempotent, so the whole chain can be re-run from scratch
//! and converge to the same observable state. No stage failure aborts the
//! run: errors are logged and the account (or the next account) continues.

use crate::config::AccountConfig;
use crate::dedupe;
use crate::error::Error;
use crate::source::InsightSource;
use crate::store::FactStore;
use crate::sync::{self, Mirror};
use adsync_core::{normalize, FactRecord, RawInsight};
use chrono::{NaiveDate, Utc};

/// What date span to request from the insight source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Yesterday only (the scheduled daily run).
    Yesterday,
    /// An inclusive historical range (backfill).
    Range { start: NaiveDate, end: NaiveDate },
}

/// Counters for one account's run, for the end-of-run log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountSummary {
    /// Raw records fetched from the source.
    pub fetched: usize,
    /// Records appended to the warehouse after normalization.
    pub appended: usize,
    /// Zero-activity or malformed records dropped by normalization.
    pub dropped: usize,
    /// Duplicate facts removed by the recency reconciler.
    pub duplicates_removed: usize,
    /// Rows appended to the mirror.
    pub mirror_rows_appended: usize,
    /// Duplicate rows removed from the mirror.
    pub mirror_duplicates_removed: usize,
}

/// Run the full chain for one account.
///
/// Assumes the destination table already exists (see
/// [`Warehouse::ensure_table`](crate::store::Warehouse::ensure_table)).
pub async fn run_account<Src, S, M>(
    source: &Src,
    store: &S,
    mirror: &M,
    account: &AccountConfig,
    mode: FetchMode,
    skip_mirror: bool,
) -> AccountSummary
where
    Src: InsightSource,
    S: FactStore,
    M: Mirror,
{
    let mut summary = AccountSummary::default();
    let table = account.table.as_str();

    // 1. Fetch. A source failure yields an empty batch; the cleanup and
    //    mirror stages still run so a previous partial load gets synced.
    let raws = fetch(source, account, mode).await;
    summary.fetched = raws.len();

    // 2. Normalize and append in one batch.
    let collected_at = Utc::now();
    let records: Vec<FactRecord> = raws
        .iter()
        .filter_map(|raw| normalize(raw, collected_at))
        .collect();
    summary.dropped = summary.fetched - records.len();

    if records.is_empty() {
        tracing::info!(account = %account.name, "no records to append");
    } else {
        match store.append(table, &records).await {
            Ok(()) => {
                summary.appended = records.len();
                tracing::info!(
                    account = %account.name,
                    table,
                    appended = summary.appended,
                    dropped = summary.dropped,
                    "facts appended"
                );
            }
            Err(e) => {
                tracing::error!(account = %account.name, table, error = %e, "append failed");
            }
        }
    }

    // 3. Recency reconcile (best-effort cleanup, never load-critical).
    match dedupe::reconcile(store, table).await {
        Ok(stats) => summary.duplicates_removed = stats.rows_removed,
        Err(e) => {
            tracing::warn!(account = %account.name, table, error = %e, "recency reconcile failed")
        }
    }

    // 4. Mirror stages.
    if skip_mirror {
        tracing::debug!(account = %account.name, "mirror sync skipped by flag");
        return summary;
    }
    let Some(route) = sync::route_for_table(table) else {
        tracing::debug!(account = %account.name, table, "no mirror route, skipping sync");
        return summary;
    };

    match sync::append_new_rows(store, mirror, table, route.tab).await {
        Ok(stats) => summary.mirror_rows_appended = stats.rows_appended,
        Err(Error::MirrorNotFound { tab }) => {
            tracing::warn!(account = %account.name, tab, "mirror tab missing, skipping sync");
            return summary;
        }
        Err(e) => {
            tracing::warn!(account = %account.name, tab = route.tab, error = %e, "mirror append failed");
            return summary;
        }
    }

    match sync::clean_duplicates(mirror, route.tab).await {
        Ok(stats) => summary.mirror_duplicates_removed = stats.duplicates_removed,
        Err(e) => {
            tracing::warn!(account = %account.name, tab = route.tab, error = %e, "mirror cleanup failed")
        }
    }

    summary
}

async fn fetch<Src: InsightSource>(
    source: &Src,
    account: &AccountConfig,
    mode: FetchMode,
) -> Vec<RawInsight> {
    match mode {
        FetchMode::Yesterday => match source.fetch_yesterday(&account.account_id).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    account = %account.name,
                    source = source.name(),
                    error = %e,
                    "daily fetch failed, continuing with empty batch"
                );
                Vec::new()
            }
        },
        FetchMode::Range { start, end } => {
            match source.fetch_range(&account.account_id, start, end).await {
                Ok(batch) => {
                    if batch.windows_failed > 0 {
                        tracing::warn!(
                            account = %account.name,
                            failed = batch.windows_failed,
                            total = batch.windows_total,
                            "some fetch windows were skipped; re-run the range to recover"
                        );
                    }
                    batch.records
                }
                Err(e) => {
                    tracing::warn!(
                        account = %account.name,
                        source = source.name(),
                        error = %e,
                        "range fetch failed, continuing with empty batch"
                    );
                    Vec::new()
                }
            }
        }
    }
}

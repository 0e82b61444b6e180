//! Recency reconciliation for the append store.
//!
//! Ingestion is append-only, so re-running a fetch lands the same facts
//! again with a newer `collected_at`. This module collapses duplicates:
//! per natural key, only the most recently collected version survives
//! (last-writer-wins). The rewrite goes through
//! [`FactStore::replace_all`], which is atomic, so a failed pass leaves
//! the table exactly as it was.
//!
//! This is a best-effort cleanup stage: callers log failures and keep the
//! pipeline moving.

use crate::error::Result;
use crate::store::FactStore;
use adsync_core::{FactRecord, NaturalKey};
use std::collections::HashMap;

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupeStats {
    /// Rows in the table before the pass.
    pub rows_before: usize,
    /// Duplicate rows removed (0 means no rewrite was issued).
    pub rows_removed: usize,
}

/// Keep, per natural key, the row with the maximum `collected_at`.
///
/// Exact-timestamp ties keep the first row encountered; any single survivor
/// is acceptable. Output is deterministically ordered by
/// `(report_date, campaign_name, ad_name, ad_id)` regardless of input order.
pub fn keep_latest(rows: Vec<FactRecord>) -> (Vec<FactRecord>, usize) {
    let before = rows.len();
    let mut latest: HashMap<NaturalKey, FactRecord> = HashMap::with_capacity(before);

    for row in rows {
        match latest.entry(row.natural_key()) {
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(row);
            }
            std::collections::hash_map::Entry::Occupied(mut slot) => {
                if row.collected_at > slot.get().collected_at {
                    slot.insert(row);
                }
            }
        }
    }

    let mut survivors: Vec<FactRecord> = latest.into_values().collect();
    survivors.sort_by(|a, b| {
        (a.report_date, &a.campaign_name, &a.ad_name, &a.ad_id)
            .cmp(&(b.report_date, &b.campaign_name, &b.ad_name, &b.ad_id))
    });

    let removed = before - survivors.len();
    (survivors, removed)
}

/// Rewrite `table` so that only the newest version of each fact remains.
///
/// Reads the whole table, collapses duplicates with [`keep_latest`], and
/// replaces the contents atomically. Skips the write entirely when the
/// table is already clean, so repeated runs converge to a no-op.
pub async fn reconcile<S: FactStore>(store: &S, table: &str) -> Result<DedupeStats> {
    let rows = store.fetch_all(table).await?;
    let stats = DedupeStats {
        rows_before: rows.len(),
        rows_removed: 0,
    };

    if rows.is_empty() {
        tracing::debug!(table, "nothing to reconcile");
        return Ok(stats);
    }

    let (survivors, removed) = keep_latest(rows);
    if removed == 0 {
        tracing::info!(table, rows = stats.rows_before, "no duplicate facts found");
        return Ok(stats);
    }

    store.replace_all(table, survivors).await?;
    tracing::info!(table, removed, "duplicate facts removed");

    Ok(DedupeStats {
        rows_removed: removed,
        ..stats
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn record(ad_id: &str, collected_hour: u32, spend: f64, leads: u64) -> FactRecord {
        FactRecord {
            campaign_name: "spring".into(),
            ad_name: "video-a".into(),
            ad_id: ad_id.to_string(),
            exposures: 100,
            clicks: 5,
            leads,
            result_type: "Lead".into(),
            spend,
            report_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            collected_at: Utc
                .with_ymd_and_hms(2025, 1, 2, collected_hour, 0, 0)
                .unwrap(),
            channel: "meta".into(),
        }
    }

    #[test]
    fn newest_version_survives() {
        let (survivors, removed) = keep_latest(vec![
            record("A1", 8, 100.0, 2),
            record("A1", 9, 120.0, 3),
        ]);
        assert_eq!(removed, 1);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].spend, 120.0);
        assert_eq!(survivors[0].leads, 3);
    }

    #[test]
    fn order_of_ingestion_does_not_matter() {
        let (a, _) = keep_latest(vec![record("A1", 8, 100.0, 2), record("A1", 9, 120.0, 3)]);
        let (b, _) = keep_latest(vec![record("A1", 9, 120.0, 3), record("A1", 8, 100.0, 2)]);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_keys_are_untouched() {
        let (survivors, removed) =
            keep_latest(vec![record("A1", 8, 100.0, 2), record("A2", 8, 50.0, 1)]);
        assert_eq!(removed, 0);
        assert_eq!(survivors.len(), 2);
        // Deterministic output order.
        assert_eq!(survivors[0].ad_id, "A1");
        assert_eq!(survivors[1].ad_id, "A2");
    }

    #[test]
    fn exact_tie_keeps_a_single_survivor() {
        let (survivors, removed) =
            keep_latest(vec![record("A1", 8, 100.0, 2), record("A1", 8, 120.0, 3)]);
        assert_eq!(removed, 1);
        assert_eq!(survivors.len(), 1);
    }

    #[tokio::test]
    async fn reconcile_rewrites_only_when_dirty() {
        let store = MemoryStore::new();
        store
            .append("t", &[record("A1", 8, 100.0, 2), record("A1", 9, 120.0, 3)])
            .await
            .unwrap();

        let stats = reconcile(&store, "t").await.unwrap();
        assert_eq!(stats.rows_before, 2);
        assert_eq!(stats.rows_removed, 1);

        let rows = store.fetch_all("t").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].spend, 120.0);

        // Second pass is a no-op.
        let stats = reconcile(&store, "t").await.unwrap();
        assert_eq!(stats.rows_before, 1);
        assert_eq!(stats.rows_removed, 0);
    }

    #[tokio::test]
    async fn reconcile_empty_table_is_a_noop() {
        let store = MemoryStore::new();
        let stats = reconcile(&store, "t").await.unwrap();
        assert_eq!(stats, DedupeStats::default());
    }
}

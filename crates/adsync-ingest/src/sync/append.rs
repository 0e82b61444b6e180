//! Position-seeking append of new warehouse rows into the mirror.

use super::mirror::Mirror;
use super::watermark::next_sync_date;
use crate::error::Result;
use crate::store::FactStore;
use adsync_core::FactRecord;
use chrono::NaiveDate;

/// Outcome of one mirror append pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorAppendStats {
    /// Resume date derived from the mirror before writing.
    pub watermark: NaiveDate,
    /// Rows appended (0 means the mirror was already current).
    pub rows_appended: usize,
}

/// Render one fact as the mirror's 8 presentation cells.
///
/// `[report_date, campaign, ad, ad_id, result_type, leads-or-blank, cpa,
/// spend]` with `spend` rounded to whole currency units.
pub fn mirror_cells(record: &FactRecord) -> Vec<String> {
    let leads_display = if record.leads > 0 {
        record.leads.to_string()
    } else {
        String::new()
    };

    vec![
        record.report_date.format("%Y-%m-%d").to_string(),
        record.campaign_name.clone(),
        record.ad_name.clone(),
        record.ad_id.clone(),
        record.result_type.clone(),
        leads_display,
        record.cpa().to_string(),
        (record.spend.round() as i64).to_string(),
    ]
}

/// Pull everything newer than the mirror's watermark from the warehouse and
/// append it below the mirror's last occupied row.
///
/// The write is a single bulk range update: a sync for a date either lands
/// all of its known rows or none of them, which is what keeps the
/// max-date-as-watermark scheme sound. Existing mirror rows are never
/// touched; an empty result set is a normal no-op.
pub async fn append_new_rows<S: FactStore, M: Mirror>(
    store: &S,
    mirror: &M,
    table: &str,
    tab: &str,
) -> Result<MirrorAppendStats> {
    let column = mirror.col_values(tab).await?;
    let watermark = next_sync_date(&column);
    tracing::info!(table, tab, %watermark, "mirror watermark read");

    let records = store.fetch_since(table, watermark).await?;
    if records.is_empty() {
        tracing::info!(table, tab, "mirror is current, nothing to append");
        return Ok(MirrorAppendStats {
            watermark,
            rows_appended: 0,
        });
    }

    let rows: Vec<Vec<String>> = records.iter().map(mirror_cells).collect();

    // First unused row: one past the occupied depth of the date column.
    let next_row = column.len() + 1;
    mirror.update_rows(tab, next_row, &rows).await?;

    tracing::info!(
        table,
        tab,
        rows = rows.len(),
        start_row = next_row,
        "mirror rows appended"
    );

    Ok(MirrorAppendStats {
        watermark,
        rows_appended: rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FactStore, MemoryStore};
    use crate::sync::MemoryMirror;
    use chrono::{TimeZone, Utc};

    fn record(day: u32, campaign: &str, spend: f64, leads: u64) -> FactRecord {
        FactRecord {
            campaign_name: campaign.to_string(),
            ad_name: "video-a".into(),
            ad_id: "A1".into(),
            exposures: 1000,
            clicks: 10,
            leads,
            result_type: if leads > 0 { "Lead".into() } else { String::new() },
            spend,
            report_date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            collected_at: Utc.with_ymd_and_hms(2025, 1, day, 8, 0, 0).unwrap(),
            channel: "meta".into(),
        }
    }

    fn header() -> Vec<String> {
        vec![
            "report_date".into(),
            "campaign".into(),
            "ad".into(),
            "ad_id".into(),
            "result_type".into(),
            "leads".into(),
            "cpa".into(),
            "spend".into(),
        ]
    }

    #[test]
    fn cells_render_cpa_and_blank_leads() {
        let with_leads = mirror_cells(&record(1, "spring", 120.0, 3));
        assert_eq!(with_leads.len(), super::super::MIRROR_WIDTH);
        assert_eq!(
            with_leads,
            vec!["2025-01-01", "spring", "video-a", "A1", "Lead", "3", "40", "120"]
        );

        let without_leads = mirror_cells(&record(1, "spring", 55.4, 0));
        assert_eq!(without_leads[5], "");
        assert_eq!(without_leads[6], "0");
        assert_eq!(without_leads[7], "55");
    }

    #[tokio::test]
    async fn appends_below_existing_rows() {
        let store = MemoryStore::new();
        store
            .append("meta_ads_beauty", &[record(5, "spring", 120.0, 3)])
            .await
            .unwrap();

        let mirror = MemoryMirror::new();
        mirror.add_tab(
            "B-Meta",
            vec![header(), mirror_cells(&record(4, "winter", 10.0, 1))],
        );

        let stats = append_new_rows(&store, &mirror, "meta_ads_beauty", "B-Meta")
            .await
            .unwrap();
        assert_eq!(stats.watermark, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
        assert_eq!(stats.rows_appended, 1);

        let grid = mirror.all_values("B-Meta").await.unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[2][0], "2025-01-05");
    }

    #[tokio::test]
    async fn rows_at_or_behind_watermark_are_not_recopied() {
        let store = MemoryStore::new();
        store
            .append("meta_ads_beauty", &[record(4, "winter", 10.0, 1)])
            .await
            .unwrap();

        let mirror = MemoryMirror::new();
        mirror.add_tab(
            "B-Meta",
            vec![header(), mirror_cells(&record(4, "winter", 10.0, 1))],
        );

        let stats = append_new_rows(&store, &mirror, "meta_ads_beauty", "B-Meta")
            .await
            .unwrap();
        assert_eq!(stats.rows_appended, 0);
        assert_eq!(mirror.all_values("B-Meta").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_mirror_starts_from_epoch() {
        let store = MemoryStore::new();
        store
            .append("meta_ads_beauty", &[record(1, "spring", 120.0, 3)])
            .await
            .unwrap();

        let mirror = MemoryMirror::new();
        mirror.add_tab("B-Meta", vec![header()]);

        let stats = append_new_rows(&store, &mirror, "meta_ads_beauty", "B-Meta")
            .await
            .unwrap();
        assert_eq!(stats.watermark, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(stats.rows_appended, 1);
    }
}

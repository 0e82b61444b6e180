//! Insight source adapters.
//!
//! A source produces raw, provider-shaped insight records for one ad
//! account. The pipeline normalizes them afterwards; sources do no shaping
//! of their own beyond deserialization.
//!
//! All sources implement [`InsightSource`], so the pipeline (and its tests)
//! are independent of the concrete provider client.

mod meta;

pub use meta::MetaInsights;

use crate::error::Result;
use adsync_core::RawInsight;
use chrono::{Days, NaiveDate};

/// Ad-level report fields requested from the provider.
pub const INSIGHT_FIELDS: [&str; 7] = [
    "campaign_name",
    "ad_name",
    "ad_id",
    "spend",
    "impressions",
    "clicks",
    "actions",
];

/// Longest span (in days beyond the start) requested in one provider call.
/// Larger historical ranges are chunked to respect provider limits.
pub const MAX_WINDOW_DAYS: u64 = 20;

/// A source of raw insight records for ad accounts.
#[allow(async_fn_in_trait)]
pub trait InsightSource {
    /// Human-readable name for this source (used in logs).
    fn name(&self) -> &'static str;

    /// Fetch yesterday's ad-level insights for one account.
    async fn fetch_yesterday(&self, account_id: &str) -> Result<Vec<RawInsight>>;

    /// Fetch ad-level daily insights over an inclusive date range.
    ///
    /// The range is processed as sequential sub-windows; a window that
    /// fails is logged and skipped rather than failing the whole range.
    async fn fetch_range(
        &self,
        account_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchBatch>;
}

/// Result of a (possibly chunked) range fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchBatch {
    /// Raw records across all successful windows, in window order.
    pub records: Vec<RawInsight>,
    /// Sub-windows the range was split into.
    pub windows_total: usize,
    /// Sub-windows skipped after a provider error.
    pub windows_failed: usize,
}

/// Split an inclusive date range into sequential sub-windows of at most
/// [`MAX_WINDOW_DAYS`] days beyond each window's start.
///
/// Windows are inclusive on both ends, contiguous, and cover the range
/// exactly. An inverted range yields no windows.
pub fn date_windows(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    let mut windows = Vec::new();
    let mut current = start;

    while current <= end {
        let window_end = current
            .checked_add_days(Days::new(MAX_WINDOW_DAYS))
            .unwrap_or(end)
            .min(end);
        windows.push((current, window_end));
        match window_end.checked_add_days(Days::new(1)) {
            Some(next) => current = next,
            None => break,
        }
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn short_range_is_one_window() {
        let windows = date_windows(date(2025, 1, 1), date(2025, 1, 10));
        assert_eq!(windows, vec![(date(2025, 1, 1), date(2025, 1, 10))]);
    }

    #[test]
    fn single_day_range_is_one_window() {
        let windows = date_windows(date(2025, 1, 1), date(2025, 1, 1));
        assert_eq!(windows, vec![(date(2025, 1, 1), date(2025, 1, 1))]);
    }

    #[test]
    fn long_range_chunks_contiguously() {
        let windows = date_windows(date(2025, 1, 1), date(2025, 3, 1));
        assert_eq!(
            windows,
            vec![
                (date(2025, 1, 1), date(2025, 1, 21)),
                (date(2025, 1, 22), date(2025, 2, 11)),
                (date(2025, 2, 12), date(2025, 3, 1)),
            ]
        );
        // Contiguous cover: each window starts the day after the previous ends.
        for pair in windows.windows(2) {
            assert_eq!(pair[0].1.succ_opt().unwrap(), pair[1].0);
        }
    }

    #[test]
    fn inverted_range_yields_nothing() {
        assert!(date_windows(date(2025, 2, 1), date(2025, 1, 1)).is_empty());
    }
}

//! Watermark derivation from the mirror's date column.
//!
//! The mirror's maximum date is treated as "fully synced through", which
//! holds because the appender only ever writes whole batches in a single
//! update. The resume point is therefore `max(dates) + 1 day`, or a fixed
//! epoch when the mirror holds no parseable date at all.

use adsync_core::sync_epoch;
use chrono::{Days, NaiveDate, NaiveDateTime};

/// Date renderings accepted from mirror cells. Humans edit these sheets.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a single mirror cell as a date, tolerantly.
///
/// Blank and non-date cells yield `None`; they are skipped, never an error.
pub fn parse_cell_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cell, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(cell, format) {
            return Some(ts.date());
        }
    }
    None
}

/// Next date to sync, derived from the mirror's first column.
///
/// The first entry is the header and is always skipped. Returns
/// `max(parsed dates) + 1 day`, or the sync epoch when no cell parses.
pub fn next_sync_date(column: &[String]) -> NaiveDate {
    let last = column
        .iter()
        .skip(1)
        .filter_map(|cell| parse_cell_date(cell))
        .max();

    match last {
        Some(date) => date
            .checked_add_days(Days::new(1))
            .unwrap_or_else(sync_epoch),
        None => sync_epoch(),
    }
}

//! Core types and normalization for the adsync pipeline.
//!
//! This crate provides:
//! - The canonical [`FactRecord`] row shape shared by the warehouse and the
//!   mirror sync stages
//! - The provider-shaped [`RawInsight`] record and its normalization into
//!   fact records
//! - Priority-ordered result extraction from the provider's action list
//!
//! Everything here is pure: no I/O, no clocks. The current wall-clock time
//! is always passed in by the caller, which keeps normalization a
//! deterministic function of its inputs.

mod actions;
mod insight;
mod record;

use chrono::NaiveDate;

// ═══════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════

/// Channel tag stamped on every record ingested from the Meta insights API.
pub const META_CHANNEL: &str = "meta";

/// Default resume date when a mirror holds no valid dates yet.
///
/// The watermark reader falls back to this when a mirror tab is empty or
/// contains only unparseable date cells.
pub fn sync_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("static date is valid")
}

pub use actions::{extract_result, RESULT_PRIORITY};
pub use insight::{coerce_count, coerce_spend, normalize, Action, RawInsight};
pub use record::{FactRecord, NaturalKey};

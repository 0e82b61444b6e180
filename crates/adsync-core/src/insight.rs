//! Provider-shaped insight records and their normalization.
//!
//! The Meta insights API returns numeric columns as JSON strings ("120.5"),
//! occasionally as numbers, and omits fields entirely for rows without
//! activity. [`normalize`] maps one raw record into the canonical
//! [`FactRecord`] shape, coercing every numeric to a safe default rather
//! than failing the batch on a single malformed cell.

use crate::actions::extract_result;
use crate::record::FactRecord;
use crate::META_CHANNEL;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

/// One named action counter inside an insight row.
#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub value: Value,
}

/// One raw ad-level insight row as returned by the provider.
///
/// Field names are the provider's; renaming to canonical names happens in
/// [`normalize`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInsight {
    #[serde(default)]
    pub campaign_name: String,
    #[serde(default)]
    pub ad_name: String,
    #[serde(default)]
    pub ad_id: String,
    #[serde(default)]
    pub spend: Value,
    #[serde(default)]
    pub impressions: Value,
    #[serde(default)]
    pub clicks: Value,
    #[serde(default)]
    pub actions: Option<Vec<Action>>,
    #[serde(default)]
    pub date_start: String,
}

/// Coerce a provider value to a fractional number, defaulting to 0.0.
pub fn coerce_spend(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Coerce a provider value to a count, defaulting to 0.
///
/// Fractional inputs are truncated; negative inputs clamp to 0.
pub fn coerce_count(value: &Value) -> u64 {
    let n = coerce_spend(value);
    if n > 0.0 {
        n as u64
    } else {
        0
    }
}

/// Normalize one raw insight into a canonical fact record.
///
/// Returns `None` when the record carries no information: zero leads, zero
/// spend, and zero clicks after coercion (zero-activity rows are dropped at
/// ingestion), or when its report date does not parse.
pub fn normalize(raw: &RawInsight, collected_at: DateTime<Utc>) -> Option<FactRecord> {
    let report_date = NaiveDate::parse_from_str(raw.date_start.trim(), "%Y-%m-%d").ok()?;

    let (result_value, result_label) = match &raw.actions {
        Some(actions) => extract_result(actions),
        None => (0.0, ""),
    };

    let leads = if result_value > 0.0 {
        result_value as u64
    } else {
        0
    };
    let spend = coerce_spend(&raw.spend);
    let clicks = coerce_count(&raw.clicks);

    if leads == 0 && spend == 0.0 && clicks == 0 {
        return None;
    }

    Some(FactRecord {
        campaign_name: raw.campaign_name.clone(),
        ad_name: raw.ad_name.clone(),
        ad_id: raw.ad_id.clone(),
        exposures: coerce_count(&raw.impressions),
        clicks,
        leads,
        result_type: result_label.to_string(),
        spend,
        report_date,
        collected_at,
        channel: META_CHANNEL.to_string(),
    })
}

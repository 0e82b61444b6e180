//! The canonical fact record and its natural key.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One advertising-performance fact as stored in the warehouse.
///
/// Multiple versions of the same [`NaturalKey`] may coexist in the append
/// store at any time; the recency reconciler later keeps only the version
/// with the largest `collected_at`. A record is otherwise immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
    pub campaign_name: String,
    pub ad_name: String,
    pub ad_id: String,
    pub exposures: u64,
    pub clicks: u64,
    pub leads: u64,
    /// Human label of the primary conversion event, or empty.
    pub result_type: String,
    pub spend: f64,
    pub report_date: NaiveDate,
    /// Ingestion timestamp. Tiebreak field only, never part of identity.
    pub collected_at: DateTime<Utc>,
    pub channel: String,
}

/// Business identity of a fact: "the same fact reported twice" shares a key.
///
/// `collected_at` is deliberately excluded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NaturalKey {
    pub report_date: NaiveDate,
    pub campaign_name: String,
    pub ad_name: String,
    pub ad_id: String,
    pub channel: String,
}

impl FactRecord {
    /// The natural key identifying this fact across re-ingestions.
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            report_date: self.report_date,
            campaign_name: self.campaign_name.clone(),
            ad_name: self.ad_name.clone(),
            ad_id: self.ad_id.clone(),
            channel: self.channel.clone(),
        }
    }

    /// Cost per acquisition for presentation: `round(spend / leads)` when
    /// there are leads, otherwise 0.
    pub fn cpa(&self) -> i64 {
        if self.leads > 0 {
            (self.spend / self.leads as f64).round() as i64
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> FactRecord {
        FactRecord {
            campaign_name: "spring".into(),
            ad_name: "video-a".into(),
            ad_id: "A1".into(),
            exposures: 1000,
            clicks: 10,
            leads: 3,
            result_type: "Lead".into(),
            spend: 120.0,
            report_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            collected_at: Utc.with_ymd_and_hms(2025, 1, 2, 8, 0, 0).unwrap(),
            channel: "meta".into(),
        }
    }

    #[test]
    fn natural_key_excludes_collected_at() {
        let a = sample();
        let mut b = sample();
        b.collected_at = Utc.with_ymd_and_hms(2025, 1, 3, 8, 0, 0).unwrap();
        b.spend = 999.0;
        assert_eq!(a.natural_key(), b.natural_key());
    }

    #[test]
    fn natural_key_distinguishes_ad_id() {
        let a = sample();
        let mut b = sample();
        b.ad_id = "A2".into();
        assert_ne!(a.natural_key(), b.natural_key());
    }

    #[test]
    fn cpa_rounds_spend_over_leads() {
        let r = sample();
        assert_eq!(r.cpa(), 40);
    }

    #[test]
    fn cpa_is_zero_without_leads() {
        let mut r = sample();
        r.leads = 0;
        assert_eq!(r.cpa(), 0);
    }

    #[test]
    fn cpa_rounds_half_up() {
        let mut r = sample();
        r.leads = 2;
        r.spend = 101.0; // 50.5 rounds away from zero
        assert_eq!(r.cpa(), 51);
    }
}

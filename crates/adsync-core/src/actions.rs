//! Priority-ordered result extraction from the provider's action list.
//!
//! An insight row carries a list of named action counters (leads, purchases,
//! link clicks, ...). Reporting attributes at most one "result" per row: the
//! highest-priority action present wins, contributing its numeric value and
//! a human label. This is a first-match-wins reduction, not a sum.

use crate::insight::{coerce_spend, Action};

/// Action types in attribution priority order, with their report labels.
///
/// The first entry present in a row's action list determines that row's
/// result. Order matters; do not sort.
pub const RESULT_PRIORITY: [(&str, &str); 8] = [
    ("lead", "Lead"),
    ("complete_registration", "Registration Complete"),
    ("purchase", "Purchase"),
    ("contact", "Contact"),
    ("schedule", "Schedule"),
    ("submit_application", "Application Submitted"),
    ("start_trial", "Trial Started"),
    ("link_click", "Link Click"),
];

/// Extract the `(value, label)` of the highest-priority action present.
///
/// Returns `(0.0, "")` when the list is empty or contains no known action
/// type. The position of entries within `actions` never affects the result.
pub fn extract_result(actions: &[Action]) -> (f64, &'static str) {
    for (key, label) in RESULT_PRIORITY {
        if let Some(action) = actions.iter().find(|a| a.action_type == key) {
            return (coerce_spend(&action.value), label);
        }
    }
    (0.0, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn action(atype: &str, value: serde_json::Value) -> Action {
        Action {
            action_type: atype.to_string(),
            value,
        }
    }

    #[test]
    fn lead_wins_over_purchase_regardless_of_order() {
        let forward = vec![action("lead", json!("2")), action("purchase", json!("7"))];
        let reverse = vec![action("purchase", json!("7")), action("lead", json!("2"))];
        assert_eq!(extract_result(&forward), (2.0, "Lead"));
        assert_eq!(extract_result(&reverse), (2.0, "Lead"));
    }

    #[test]
    fn falls_through_to_link_click() {
        let actions = vec![
            action("post_engagement", json!("31")),
            action("link_click", json!("5")),
        ];
        assert_eq!(extract_result(&actions), (5.0, "Link Click"));
    }

    #[test]
    fn unknown_actions_yield_empty_result() {
        let actions = vec![action("video_view", json!("100"))];
        assert_eq!(extract_result(&actions), (0.0, ""));
    }

    #[test]
    fn empty_list_yields_empty_result() {
        assert_eq!(extract_result(&[]), (0.0, ""));
    }

    #[test]
    fn numeric_values_are_accepted() {
        let actions = vec![action("purchase", json!(3))];
        assert_eq!(extract_result(&actions), (3.0, "Purchase"));
    }

    #[test]
    fn unparseable_value_counts_as_zero() {
        let actions = vec![action("lead", json!("n/a"))];
        assert_eq!(extract_result(&actions), (0.0, "Lead"));
    }
}

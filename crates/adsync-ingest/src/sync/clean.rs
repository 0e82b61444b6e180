//! Exact-row deduplication of the mirror itself.
//!
//! The appender is safe to re-run only while the watermark advances; a
//! retried run before it advances appends the same rows twice. This stage
//! is the mirror's self-healing pass: it removes byte-identical rows,
//! keeping first-seen order, and clears the rows that fell off the end.

use super::mirror::Mirror;
use crate::error::Result;
use std::collections::HashSet;

/// Rows cleared past the deduplicated body, beyond the old row count.
const CLEAR_MARGIN: usize = 4;

/// Outcome of one mirror cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorCleanStats {
    /// Body rows before the pass (header excluded).
    pub rows_before: usize,
    /// Duplicate rows removed (0 means no write was made).
    pub duplicates_removed: usize,
}

/// Remove exactly-duplicated rows from the mirror tab.
///
/// Idempotent: when no duplicates exist, nothing is written and the mirror
/// is left byte-identical. Otherwise the deduplicated body is rewritten in
/// place starting at row 2 and the now-unused trailing rows are cleared
/// with a small safety margin.
pub async fn clean_duplicates<M: Mirror>(mirror: &M, tab: &str) -> Result<MirrorCleanStats> {
    let grid = mirror.all_values(tab).await?;
    if grid.len() <= 1 {
        tracing::debug!(tab, "mirror has no body rows to clean");
        return Ok(MirrorCleanStats::default());
    }

    let body = &grid[1..];
    let rows_before = body.len();

    let mut seen: HashSet<&[String]> = HashSet::with_capacity(rows_before);
    let mut deduped: Vec<Vec<String>> = Vec::with_capacity(rows_before);
    for row in body {
        if seen.insert(row.as_slice()) {
            deduped.push(row.clone());
        }
    }

    let duplicates_removed = rows_before - deduped.len();
    if duplicates_removed == 0 {
        tracing::info!(tab, rows = rows_before, "no duplicate mirror rows found");
        return Ok(MirrorCleanStats {
            rows_before,
            duplicates_removed: 0,
        });
    }

    tracing::info!(tab, duplicates_removed, "rewriting deduplicated mirror body");

    // Rewrite the body, then clear everything from the first now-unused row
    // through the old extent plus a margin.
    mirror.update_rows(tab, 2, &deduped).await?;
    let first_unused = deduped.len() + 2;
    let clear_through = rows_before + 1 + CLEAR_MARGIN;
    mirror.clear_rows(tab, first_unused, clear_through).await?;

    Ok(MirrorCleanStats {
        rows_before,
        duplicates_removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::MemoryMirror;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn seeded_mirror(body: &[Vec<String>]) -> MemoryMirror {
        let mut grid = vec![row(&["date", "campaign", "ad", "id", "result", "leads", "cpa", "spend"])];
        grid.extend_from_slice(body);
        let mirror = MemoryMirror::new();
        mirror.add_tab("B-Meta", grid);
        mirror
    }

    #[tokio::test]
    async fn removes_exact_duplicates_preserving_order() {
        let a = row(&["2025-01-01", "spring", "v", "A1", "Lead", "3", "40", "120"]);
        let b = row(&["2025-01-02", "spring", "v", "A1", "Lead", "1", "60", "60"]);
        let mirror = seeded_mirror(&[a.clone(), b.clone(), a.clone()]);

        let stats = clean_duplicates(&mirror, "B-Meta").await.unwrap();
        assert_eq!(stats.rows_before, 3);
        assert_eq!(stats.duplicates_removed, 1);

        let grid = mirror.all_values("B-Meta").await.unwrap();
        assert_eq!(grid.len(), 3); // header + 2 rows
        assert_eq!(grid[1], a);
        assert_eq!(grid[2], b);
    }

    #[tokio::test]
    async fn second_run_is_a_noop() {
        let a = row(&["2025-01-01", "spring", "v", "A1", "Lead", "3", "40", "120"]);
        let mirror = seeded_mirror(&[a.clone(), a.clone()]);

        clean_duplicates(&mirror, "B-Meta").await.unwrap();
        let after_first = mirror.all_values("B-Meta").await.unwrap();

        let stats = clean_duplicates(&mirror, "B-Meta").await.unwrap();
        assert_eq!(stats.duplicates_removed, 0);
        assert_eq!(mirror.all_values("B-Meta").await.unwrap(), after_first);
        assert_eq!(mirror.writes("B-Meta"), 1); // only the first pass wrote
    }

    #[tokio::test]
    async fn near_duplicates_are_kept() {
        let a = row(&["2025-01-01", "spring", "v", "A1", "Lead", "3", "40", "120"]);
        let mut b = a.clone();
        b[7] = "121".to_string();
        let mirror = seeded_mirror(&[a, b]);

        let stats = clean_duplicates(&mirror, "B-Meta").await.unwrap();
        assert_eq!(stats.duplicates_removed, 0);
    }

    #[tokio::test]
    async fn empty_tab_is_a_noop() {
        let mirror = MemoryMirror::new();
        mirror.add_tab("B-Meta", vec![]);
        let stats = clean_duplicates(&mirror, "B-Meta").await.unwrap();
        assert_eq!(stats, MirrorCleanStats::default());
    }
}

//! In-memory mirror for tests.

use super::mirror::Mirror;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Tab {
    rows: Vec<Vec<String>>,
    writes: usize,
}

/// In-memory [`Mirror`] with spreadsheet-like grid semantics.
///
/// Tabs must be created with [`MemoryMirror::add_tab`]; addressing a
/// missing tab yields [`Error::MirrorNotFound`], like the real mirror.
#[derive(Debug, Default)]
pub struct MemoryMirror {
    tabs: Mutex<HashMap<String, Tab>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or reset) a tab with the given grid contents.
    pub fn add_tab(&self, name: &str, rows: Vec<Vec<String>>) {
        let mut tabs = self.tabs.lock().expect("mirror lock poisoned");
        tabs.insert(name.to_string(), Tab { rows, writes: 0 });
    }

    /// Number of `update_rows` calls made against a tab.
    pub fn writes(&self, tab: &str) -> usize {
        let tabs = self.tabs.lock().expect("mirror lock poisoned");
        tabs.get(tab).map_or(0, |t| t.writes)
    }

    fn row_is_empty(row: &[String]) -> bool {
        row.iter().all(|cell| cell.is_empty())
    }
}

impl Mirror for MemoryMirror {
    async fn col_values(&self, tab: &str) -> Result<Vec<String>> {
        let tabs = self.tabs.lock().expect("mirror lock poisoned");
        let grid = tabs.get(tab).ok_or_else(|| Error::MirrorNotFound {
            tab: tab.to_string(),
        })?;

        let mut column: Vec<String> = grid
            .rows
            .iter()
            .map(|row| row.first().cloned().unwrap_or_default())
            .collect();
        while column.last().is_some_and(String::is_empty) {
            column.pop();
        }
        Ok(column)
    }

    async fn all_values(&self, tab: &str) -> Result<Vec<Vec<String>>> {
        let tabs = self.tabs.lock().expect("mirror lock poisoned");
        let grid = tabs.get(tab).ok_or_else(|| Error::MirrorNotFound {
            tab: tab.to_string(),
        })?;

        let mut rows = grid.rows.clone();
        while rows.last().is_some_and(|row| Self::row_is_empty(row)) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn update_rows(&self, tab: &str, start_row: usize, rows: &[Vec<String>]) -> Result<()> {
        let mut tabs = self.tabs.lock().expect("mirror lock poisoned");
        let grid = tabs.get_mut(tab).ok_or_else(|| Error::MirrorNotFound {
            tab: tab.to_string(),
        })?;

        let start = start_row.saturating_sub(1);
        if grid.rows.len() < start + rows.len() {
            grid.rows.resize(start + rows.len(), Vec::new());
        }
        for (offset, row) in rows.iter().enumerate() {
            grid.rows[start + offset] = row.clone();
        }
        grid.writes += 1;
        Ok(())
    }

    async fn clear_rows(&self, tab: &str, from_row: usize, to_row: usize) -> Result<()> {
        let mut tabs = self.tabs.lock().expect("mirror lock poisoned");
        let grid = tabs.get_mut(tab).ok_or_else(|| Error::MirrorNotFound {
            tab: tab.to_string(),
        })?;

        for index in from_row.saturating_sub(1)..to_row.min(grid.rows.len()) {
            grid.rows[index] = Vec::new();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn missing_tab_is_not_found() {
        let mirror = MemoryMirror::new();
        let err = mirror.col_values("nope").await.unwrap_err();
        assert!(matches!(err, Error::MirrorNotFound { tab } if tab == "nope"));
    }

    #[tokio::test]
    async fn update_extends_the_grid() {
        let mirror = MemoryMirror::new();
        mirror.add_tab("t", vec![row(&["header"])]);
        mirror
            .update_rows("t", 2, &[row(&["a"]), row(&["b"])])
            .await
            .unwrap();

        assert_eq!(mirror.col_values("t").await.unwrap(), vec!["header", "a", "b"]);
    }

    #[tokio::test]
    async fn clear_trims_trailing_rows_from_reads() {
        let mirror = MemoryMirror::new();
        mirror.add_tab("t", vec![row(&["header"]), row(&["a"]), row(&["b"])]);
        mirror.clear_rows("t", 3, 10).await.unwrap();

        assert_eq!(mirror.col_values("t").await.unwrap(), vec!["header", "a"]);
        assert_eq!(mirror.all_values("t").await.unwrap().len(), 2);
    }
}

//! In-memory fact store for tests.

use super::FactStore;
use crate::error::Result;
use adsync_core::FactRecord;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory [`FactStore`] keeping one row vector per table.
///
/// Read results are sorted the same way the warehouse sorts them, so the
/// reconciler and mirror appender behave identically against either backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<FactRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently in a table.
    pub fn len(&self, table: &str) -> usize {
        self.tables
            .lock()
            .expect("store lock poisoned")
            .get(table)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    fn sorted(mut rows: Vec<FactRecord>) -> Vec<FactRecord> {
        rows.sort_by(|a, b| {
            (a.report_date, &a.campaign_name).cmp(&(b.report_date, &b.campaign_name))
        });
        rows
    }
}

impl FactStore for MemoryStore {
    async fn append(&self, table: &str, rows: &[FactRecord]) -> Result<()> {
        let mut tables = self.tables.lock().expect("store lock poisoned");
        tables
            .entry(table.to_string())
            .or_default()
            .extend_from_slice(rows);
        Ok(())
    }

    async fn fetch_all(&self, table: &str) -> Result<Vec<FactRecord>> {
        let tables = self.tables.lock().expect("store lock poisoned");
        Ok(Self::sorted(
            tables.get(table).cloned().unwrap_or_default(),
        ))
    }

    async fn fetch_since(&self, table: &str, since: NaiveDate) -> Result<Vec<FactRecord>> {
        let tables = self.tables.lock().expect("store lock poisoned");
        let rows = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.report_date >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self::sorted(rows))
    }

    async fn replace_all(&self, table: &str, rows: Vec<FactRecord>) -> Result<()> {
        let mut tables = self.tables.lock().expect("store lock poisoned");
        tables.insert(table.to_string(), rows);
        Ok(())
    }
}

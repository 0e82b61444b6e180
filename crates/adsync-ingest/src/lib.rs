//! adsync ingestion and mirror-sync pipeline.
//!
//! This crate pulls ad-level performance facts from the Meta insights API,
//! lands them in per-account ClickHouse tables, and keeps a spreadsheet
//! mirror in step with the warehouse using a date watermark.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐
//! │  MetaInsights  │  Graph API insights, paged, chunked for backfills
//! └───────┬────────┘
//!         │ normalize (adsync-core)
//!         ▼
//! ┌────────────────┐
//! │   Warehouse    │  ClickHouse, append-only fact tables
//! └───────┬────────┘
//!         │ recency reconcile (last-writer-wins rewrite)
//!         ▼
//! ┌────────────────┐
//! │  mirror sync   │  watermark → bulk append → exact-row dedup
//! └────────────────┘
//! ```
//!
//! The warehouse is the source of truth; the mirror is a derived,
//! rebuildable artifact. Re-running the whole chain converges to the same
//! observable state.

pub mod config;
pub mod dedupe;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod sync;

// Re-export commonly used types at crate root
pub use config::{AccountConfig, Config};
pub use error::{Error, Result};
pub use pipeline::{run_account, AccountSummary, FetchMode};
pub use source::{InsightSource, MetaInsights};
pub use store::{FactStore, MemoryStore, Warehouse};
pub use sync::{MemoryMirror, Mirror, SheetsMirror};

//! Warehouse-to-spreadsheet mirror synchronization.
//!
//! The mirror is a derived, human-facing copy of the warehouse; the
//! warehouse is always the source of truth. Sync uses only a cursor: the
//! watermark reader derives the resume date from the mirror's date column,
//! the appender writes everything newer in one bulk update, and the
//! reconciler self-heals the mirror against double-appends under an
//! unchanged watermark.
//!
//! Stage order per account: watermark → append → reconcile. Each stage is
//! idempotent, so re-running the chain converges to the same mirror state.

pub mod append;
pub mod clean;
mod memory;
mod mirror;
mod sheets;
pub mod watermark;

pub use append::{append_new_rows, MirrorAppendStats};
pub use clean::{clean_duplicates, MirrorCleanStats};
pub use memory::MemoryMirror;
pub use mirror::{Mirror, MIRROR_WIDTH};
pub use sheets::SheetsMirror;

/// Mirror destination resolved from a warehouse table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorRoute {
    /// Spreadsheet tab receiving the table's rows.
    pub tab: &'static str,
    /// Category label used in logs.
    pub category: &'static str,
}

/// Table-name tokens and the tabs they route to, tested in order.
const ROUTES: [(&str, MirrorRoute); 3] = [
    (
        "beauty",
        MirrorRoute {
            tab: "B-Meta",
            category: "beauty",
        },
    ),
    (
        "foot",
        MirrorRoute {
            tab: "F-Meta",
            category: "foot",
        },
    ),
    (
        "dosu",
        MirrorRoute {
            tab: "D-Meta",
            category: "dosu",
        },
    ),
];

/// Resolve the mirror tab for a warehouse table by substring match.
///
/// Tables matching no category token return `None` and are silently
/// skipped by the mirror-sync stages.
pub fn route_for_table(table: &str) -> Option<MirrorRoute> {
    ROUTES
        .iter()
        .find(|(token, _)| table.contains(token))
        .map(|(_, route)| *route)
}

//! The mirror capability contract.

use crate::error::Result;

/// Width of the mirror's presentation rows (columns A through H).
pub const MIRROR_WIDTH: usize = 8;

/// A rectangular grid addressable by tab name and row position.
///
/// Rows are vectors of display cells, [`MIRROR_WIDTH`] wide when written by
/// the appender. Implementations surface a missing tab as
/// [`Error::MirrorNotFound`](crate::error::Error::MirrorNotFound) so the
/// pipeline can skip that account's mirror stages.
#[allow(async_fn_in_trait)]
pub trait Mirror {
    /// Values of the first column, top to bottom, including the header.
    ///
    /// Trailing empty cells are not included; the result's length is the
    /// number of occupied rows in the column.
    async fn col_values(&self, tab: &str) -> Result<Vec<String>>;

    /// The whole occupied grid, header row included. Rows may be ragged.
    async fn all_values(&self, tab: &str) -> Result<Vec<Vec<String>>>;

    /// Bulk-write `rows` starting at `start_row` (1-based), column A.
    ///
    /// A single call is atomic from the pipeline's perspective: the
    /// appender stages a full batch and issues exactly one update.
    async fn update_rows(&self, tab: &str, start_row: usize, rows: &[Vec<String>]) -> Result<()>;

    /// Clear rows `from_row ..= to_row` (1-based) across the mirror width.
    async fn clear_rows(&self, tab: &str, from_row: usize, to_row: usize) -> Result<()>;
}

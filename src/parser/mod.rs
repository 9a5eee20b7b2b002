pub mod classify;
pub mod pipeline;
pub mod rows;

use thiserror::Error;

/// One unparsed table row: cell texts in document order, no schema.
pub type RawRow = Vec<String>;

/// A row as handed over by a source: readable cells, or the reason it
/// could not be read.
pub type SourceRow = Result<RawRow, RowFault>;

/// Why a single row was skipped. Scoped to that row only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowFault {
    #[error("row embeds a nested table, cell boundaries are ambiguous")]
    NestedTable,
    #[error("row has no data cells")]
    NoCells,
    /// `column` is 1-based.
    #[error("cell {column} is {len} chars long, not a data cell")]
    OversizedCell { column: usize, len: usize },
    /// Fault carried over from a saved row capture.
    #[error("captured fault: {0}")]
    Replayed(String),
}

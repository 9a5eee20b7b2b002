//! Top-N extraction pass: classify each row, stamp rank and capture time,
//! and skip rows that could not be read without aborting the run.

use chrono::{DateTime, Local};
use tracing::{info, warn};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::classify::{classify_row, CollisionPolicy};
use super::{RowFault, SourceRow};
use crate::record::CoinRecord;

/// A row left out of the output, with the rank it would have had.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub rank: usize,
    pub fault: RowFault,
}

/// Outcome of one pass. Records and skips are both in input order.
#[derive(Debug, Default)]
pub struct Extraction {
    pub records: Vec<CoinRecord>,
    pub skipped: Vec<SkippedRow>,
    /// Rows inside the top-N window, faulted or not.
    pub attempted: usize,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub struct Extractor {
    policy: CollisionPolicy,
    clock: fn() -> DateTime<Local>,
}

impl Extractor {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            clock: Local::now,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    /// Run one stateless pass over the first `top_n` rows.
    ///
    /// Never fails: a faulted row is logged and listed in
    /// [`Extraction::skipped`], and an empty or fully faulted input gives an
    /// empty result.
    pub fn run(&self, rows: &[SourceRow], top_n: usize) -> Extraction {
        let window = &rows[..rows.len().min(top_n)];
        let outcomes = self.assemble_all(window);

        let mut extraction = Extraction {
            attempted: window.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                Ok(record) => {
                    info!("{}. {}: ${}", record.rank, record.name, record.price);
                    extraction.records.push(record);
                }
                Err(skip) => {
                    warn!(rank = skip.rank, "Skipping row: {}", skip.fault);
                    extraction.skipped.push(skip);
                }
            }
        }
        extraction
    }

    // Order-preserving collect keeps output aligned with input positions.
    #[cfg(feature = "rayon")]
    fn assemble_all(&self, window: &[SourceRow]) -> Vec<Result<CoinRecord, SkippedRow>> {
        window
            .par_iter()
            .enumerate()
            .map(|(i, row)| self.assemble(i, row))
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn assemble_all(&self, window: &[SourceRow]) -> Vec<Result<CoinRecord, SkippedRow>> {
        self.assemble_in_order(window)
    }

    // Sequential baseline; the parallel path must match it row for row.
    #[cfg(any(test, not(feature = "rayon")))]
    fn assemble_in_order(&self, window: &[SourceRow]) -> Vec<Result<CoinRecord, SkippedRow>> {
        window
            .iter()
            .enumerate()
            .map(|(i, row)| self.assemble(i, row))
            .collect()
    }

    fn assemble(&self, index: usize, row: &SourceRow) -> Result<CoinRecord, SkippedRow> {
        let rank = index + 1;
        let cells = row.as_ref().map_err(|fault| SkippedRow {
            rank,
            fault: fault.clone(),
        })?;
        let fields = classify_row(cells, self.policy);
        Ok(CoinRecord::new(rank, (self.clock)(), fields))
    }
}

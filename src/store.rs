use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::parser::{RowFault, SourceRow};
use crate::record::CoinRecord;

/// Write records as CSV with a header row, replacing any existing file.
pub fn save_csv(path: &Path, records: &[CoinRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(BufWriter::new(file), records)
}

pub fn write_csv<W: Write>(out: W, records: &[CoinRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Captured row: its cells, or the fault it raised when it was read.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum CapturedRow {
    Cells(Vec<String>),
    Fault { fault: String },
}

/// Save raw rows as JSON so a run can be replayed offline with `parse --rows`.
pub fn save_capture(path: &Path, rows: &[SourceRow]) -> Result<()> {
    let captured: Vec<CapturedRow> = rows
        .iter()
        .map(|row| match row {
            Ok(cells) => CapturedRow::Cells(cells.clone()),
            Err(fault) => CapturedRow::Fault {
                fault: fault.to_string(),
            },
        })
        .collect();
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, &captured)?;
    out.flush()?;
    Ok(())
}

pub fn load_capture(path: &Path) -> Result<Vec<SourceRow>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let captured: Vec<CapturedRow> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not a row capture", path.display()))?;
    Ok(captured
        .into_iter()
        .map(|row| match row {
            CapturedRow::Cells(cells) => Ok(cells),
            CapturedRow::Fault { fault } => Err(RowFault::Replayed(fault)),
        })
        .collect())
}

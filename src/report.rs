use anyhow::Result;

use crate::display;
use crate::parser::pipeline::{Extraction, Extractor};
use crate::parser::SourceRow;
use crate::settings::Settings;
use crate::store;

/// Extract, print, and (optionally) save. An empty extraction prints a
/// notice and leaves any existing CSV untouched.
pub fn report(settings: &Settings, rows: &[SourceRow], write_csv: bool) -> Result<Extraction> {
    let extraction = Extractor::new(settings.collision).run(rows, settings.top_n);

    if extraction.is_empty() {
        println!("No data extracted ({} rows attempted).", extraction.attempted);
        return Ok(extraction);
    }

    println!("\nTotal cryptocurrencies tracked: {}", extraction.records.len());
    if !extraction.skipped.is_empty() {
        let ranks: Vec<String> = extraction.skipped.iter().map(|s| s.rank.to_string()).collect();
        println!("Skipped rows: {}", ranks.join(", "));
    }
    println!("\n{}", display::render_table(&extraction.records));

    if write_csv {
        store::save_csv(&settings.output, &extraction.records)?;
        println!("Data saved to {}", settings.output.display());
    }
    Ok(extraction)
}

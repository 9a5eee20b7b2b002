use crate::record::CoinRecord;

const NAME_WIDTH: usize = 20;

/// Console view of an extraction. Read-only.
pub fn render_table(records: &[CoinRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>4} | {:<width$} | {:>14} | {:>8} | {:>18}\n",
        "Rank",
        "Name",
        "Price",
        "24h %",
        "Market Cap",
        width = NAME_WIDTH
    ));
    out.push_str(&"-".repeat(76));
    out.push('\n');

    for r in records {
        out.push_str(&format!(
            "{:>4} | {:<width$} | {:>14} | {:>8} | {:>18}\n",
            r.rank,
            truncate(&r.name, NAME_WIDTH),
            r.price,
            r.change_percent,
            r.market_cap,
            width = NAME_WIDTH
        ));
    }

    if let Some(first) = records.first() {
        out.push_str(&format!("\nCaptured at {}\n", first.captured_at()));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}

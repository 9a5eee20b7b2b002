use serde::Deserialize;

const CURRENCY: char = '$';
const PERCENT: char = '%';
const SEPARATOR: char = ',';

/// Percent cells at or above this length are compound text, not a change value.
const CHANGE_MAX_CHARS: usize = 10;

/// What to do when the price scan and the market-cap scan hit the same cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Keep the value as price, leave market cap unmatched.
    #[default]
    PreferPrice,
    /// Copy the value into both fields.
    Duplicate,
}

/// Best-effort fields recovered from one row. `None` means no cell matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    pub name: Option<String>,
    pub price: Option<String>,
    pub change_percent: Option<String>,
    pub market_cap: Option<String>,
}

/// Classify one row. Each field is resolved independently; a miss on one
/// never blocks the others.
pub fn classify_row<S: AsRef<str>>(cells: &[S], policy: CollisionPolicy) -> Fields {
    let raw: Vec<&str> = cells.iter().map(|c| c.as_ref()).collect();
    let texts: Vec<&str> = raw.iter().map(|c| c.trim()).collect();

    let price_hit = first_dollar(texts.iter().copied().enumerate());
    let cap_hit = first_dollar(texts.iter().copied().enumerate().rev());

    let market_cap = match (price_hit, cap_hit) {
        (Some((p, _)), Some((c, _))) if p == c && policy == CollisionPolicy::PreferPrice => None,
        (_, hit) => hit.and_then(|(_, t)| clean_amount(t)),
    };

    Fields {
        name: extract_name(&raw),
        price: price_hit.and_then(|(_, t)| clean_amount(t)),
        change_percent: extract_change(&texts),
        market_cap,
    }
}

// Rank usually sits in column 1 and the name in column 2 or 3; shift left as
// the row gets narrower. Cut at the first newline before trimming, so a
// cell that opens with a blank line has no name.
fn extract_name(cells: &[&str]) -> Option<String> {
    let cell = match cells.len() {
        0 | 1 => return None,
        2 => cells[1],
        _ => cells[2],
    };
    non_empty(first_line(cell))
}

fn extract_change(texts: &[&str]) -> Option<String> {
    let cell = texts
        .iter()
        .find(|t| t.ends_with(PERCENT) && t.chars().count() < CHANGE_MAX_CHARS)?;
    let cleaned = cell.replace([PERCENT, SEPARATOR], "");
    let cleaned = cleaned.trim();
    non_empty(cleaned.strip_prefix('+').unwrap_or(cleaned))
}

/// First dollar-prefixed cell in iteration order, with its column index.
fn first_dollar<'a>(
    mut cells: impl Iterator<Item = (usize, &'a str)>,
) -> Option<(usize, &'a str)> {
    cells.find(|(_, t)| t.starts_with(CURRENCY))
}

fn clean_amount(text: &str) -> Option<String> {
    let stripped = text.replace([CURRENCY, SEPARATOR], "");
    non_empty(first_line(&stripped))
}

fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or_default()
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(cells: &[&str]) -> Fields {
        classify_row(cells, CollisionPolicy::PreferPrice)
    }

    #[test]
    fn full_row() {
        let f = classify(&["1", "Logo", "Bitcoin\nBTC", "$43,250.12", "+2.34%", "...", "$845.2B"]);
        assert_eq!(f.name.as_deref(), Some("Bitcoin"));
        assert_eq!(f.price.as_deref(), Some("43250.12"));
        assert_eq!(f.change_percent.as_deref(), Some("2.34"));
        assert_eq!(f.market_cap.as_deref(), Some("845.2B"));
    }

    #[test]
    fn two_cell_row_falls_back_to_second_cell() {
        let f = classify(&["1", "Ethereum"]);
        assert_eq!(f.name.as_deref(), Some("Ethereum"));
        assert_eq!(f.price, None);
        assert_eq!(f.change_percent, None);
        assert_eq!(f.market_cap, None);
    }

    #[test]
    fn no_dollar_cells() {
        let f = classify(&["3", "", "Tether\nUSDT", "1.00", "0.01%", "95B"]);
        assert_eq!(f.name.as_deref(), Some("Tether"));
        assert_eq!(f.change_percent.as_deref(), Some("0.01"));
        assert_eq!(f.price, None);
        assert_eq!(f.market_cap, None);
    }

    #[test]
    fn short_rows() {
        assert_eq!(classify(&[]), Fields::default());
        assert_eq!(classify(&["1"]), Fields::default());
    }

    #[test]
    fn single_dollar_cell_prefers_price() {
        let f = classify(&["5", "", "Solana", "$98.12", "5.5%"]);
        assert_eq!(f.price.as_deref(), Some("98.12"));
        assert_eq!(f.market_cap, None);
    }

    #[test]
    fn single_dollar_cell_duplicate_policy() {
        let f = classify_row(&["5", "", "Solana", "$98.12"], CollisionPolicy::Duplicate);
        assert_eq!(f.price.as_deref(), Some("98.12"));
        assert_eq!(f.market_cap.as_deref(), Some("98.12"));
    }

    #[test]
    fn long_percent_text_is_not_a_change() {
        let f = classify(&["1", "", "Coin", "dominance is 52.1%", "-0.75%"]);
        assert_eq!(f.change_percent.as_deref(), Some("-0.75"));
    }

    #[test]
    fn change_separators_and_sign() {
        assert_eq!(classify(&["1,234.5%"]).change_percent.as_deref(), Some("1234.5"));
        assert_eq!(classify(&["-12.40%"]).change_percent.as_deref(), Some("-12.40"));
        assert_eq!(classify(&["%"]).change_percent, None);
    }

    #[test]
    fn amounts_cut_at_first_line() {
        let f = classify(&["1", "", "X", "$1,000\n$2,000", "$21,000,000\n350K BTC"]);
        assert_eq!(f.price.as_deref(), Some("1000"));
        assert_eq!(f.market_cap.as_deref(), Some("21000000"));
    }

    #[test]
    fn bare_marker_wins_but_stays_unmatched() {
        // First dollar cell is taken even if nothing survives cleanup.
        let f = classify(&["1", "", "X", "$", "$5.00"]);
        assert_eq!(f.price, None);
        assert_eq!(f.market_cap.as_deref(), Some("5.00"));
    }

    #[test]
    fn cells_are_trimmed_before_matching() {
        let f = classify(&["  1 ", " ", "  Dogecoin \nDOGE", "  $0.08 ", " 3.1% ", " $11.5B  "]);
        assert_eq!(f.name.as_deref(), Some("Dogecoin"));
        assert_eq!(f.price.as_deref(), Some("0.08"));
        assert_eq!(f.change_percent.as_deref(), Some("3.1"));
        assert_eq!(f.market_cap.as_deref(), Some("11.5B"));
    }

    #[test]
    fn blank_name_cell_is_unmatched() {
        assert_eq!(classify(&["1", "", "\nBTC"]).name, None);
        assert_eq!(classify(&["1", "  \nEthereum"]).name, None);
    }

    #[test]
    fn name_cut_before_trim() {
        assert_eq!(classify(&["1", "", "  Bitcoin  \nBTC"]).name.as_deref(), Some("Bitcoin"));
        assert_eq!(classify(&["1", "", " \n Tether\nUSDT", "$1.00"]).name, None);
    }

    #[test]
    fn same_row_same_fields() {
        let row = ["1", "Logo", "Bitcoin\nBTC", "$43,250.12", "+2.34%", "$845.2B"];
        assert_eq!(classify(&row), classify(&row));
    }
}

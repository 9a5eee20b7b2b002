use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{RowFault, SourceRow};

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table tbody tr").unwrap());
static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Cells longer than this are script or template blobs, not rendered data.
const MAX_CELL_CHARS: usize = 2048;

/// Read every body row of every table in the page, in document order.
///
/// Rows that belong to a table nested inside another row's cell are not
/// listed on their own; the outer row is reported as a fault instead.
pub fn read_rows(html: &str) -> Vec<SourceRow> {
    let doc = Html::parse_document(html);
    doc.select(&ROW_SEL)
        .filter(|tr| !inside_cell(tr))
        .map(read_row)
        .collect()
}

fn read_row(tr: ElementRef) -> SourceRow {
    if tr.select(&TABLE_SEL).next().is_some() {
        return Err(RowFault::NestedTable);
    }

    let cells: Vec<String> = tr
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .map(cell_text)
        .collect();

    if cells.is_empty() {
        return Err(RowFault::NoCells);
    }
    if let Some((i, len)) = cells
        .iter()
        .map(|c| c.chars().count())
        .enumerate()
        .find(|(_, len)| *len > MAX_CELL_CHARS)
    {
        return Err(RowFault::OversizedCell { column: i + 1, len });
    }
    Ok(cells)
}

/// Rendered text of a cell: one line per non-blank text node, inner
/// whitespace collapsed.
fn cell_text(td: ElementRef) -> String {
    td.text()
        .map(|t| WS_RE.replace_all(t, " ").trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn inside_cell(tr: &ElementRef) -> bool {
    tr.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| matches!(el.value().name(), "td" | "th"))
}

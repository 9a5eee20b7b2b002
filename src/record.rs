use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use crate::parser::classify::Fields;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const MISSING: &str = "N/A";

/// One ranked market entry. Every field is populated: extracted text or a
/// sentinel, so the CSV shape never changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinRecord {
    #[serde(rename = "Timestamp", serialize_with = "local_seconds")]
    pub timestamp: DateTime<Local>,
    #[serde(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "24h Change (%)")]
    pub change_percent: String,
    #[serde(rename = "Market Cap")]
    pub market_cap: String,
}

impl CoinRecord {
    pub fn new(rank: usize, timestamp: DateTime<Local>, fields: Fields) -> Self {
        let or_missing = |v: Option<String>| v.unwrap_or_else(|| MISSING.to_string());
        CoinRecord {
            timestamp,
            rank,
            name: fields.name.unwrap_or_else(|| format!("Unknown-{}", rank)),
            price: or_missing(fields.price),
            change_percent: or_missing(fields.change_percent),
            market_cap: or_missing(fields.market_cap),
        }
    }

    pub fn captured_at(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

fn local_seconds<S: Serializer>(ts: &DateTime<Local>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

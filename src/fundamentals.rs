use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use crate::models::FundamentalsRecord;
use crate::normalizer::SymbolNormalizer;

/// Header of the stock identifier column in the results calendar
pub const DEFAULT_SYMBOL_COLUMN: &str = "Stock";

const INPUT_DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%d-%m-%Y"];
const OUTPUT_DATE_FORMAT: &str = "%d %b %Y";

/// Calendar header -> label shown to users
const COLUMN_LABELS: &[(&str, &str)] = &[
    ("Stock", "Symbol"),
    ("Quarterly Results Date", "Results Date"),
    ("Sales Growth %", "Sales Growth (YoY %)"),
    ("Profit Growth %", "Profit Growth (YoY %)"),
    ("Operating Margin %", "Operating Margin (%)"),
    ("EPS Growth %", "EPS Growth (YoY %)"),
];

/// Looks up results-calendar rows for a list of symbols.
///
/// The calendar is read from disk on every call. Any problem with the file
/// yields an empty result instead of an error.
#[derive(Debug, Clone)]
pub struct FundamentalsJoiner {
    calendar_path: PathBuf,
    symbol_column: String,
    normalizer: SymbolNormalizer,
}

impl FundamentalsJoiner {
    pub fn new(calendar_path: impl Into<PathBuf>) -> Self {
        Self {
            calendar_path: calendar_path.into(),
            symbol_column: DEFAULT_SYMBOL_COLUMN.to_string(),
            normalizer: SymbolNormalizer::default(),
        }
    }

    pub fn with_symbol_column(mut self, column: impl Into<String>) -> Self {
        self.symbol_column = column.into();
        self
    }

    pub fn with_normalizer(mut self, normalizer: SymbolNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Calendar rows whose symbol is in `symbols`, in file order
    pub fn fundamentals(&self, symbols: &[String]) -> Vec<FundamentalsRecord> {
        let wanted: HashSet<String> = symbols
            .iter()
            .filter_map(|s| self.normalizer.canonical(s))
            .collect();
        if wanted.is_empty() {
            return Vec::new();
        }

        match self.read_matching(&wanted) {
            Ok(records) => {
                debug!(
                    "Found {} results calendar rows for {} symbols",
                    records.len(),
                    wanted.len()
                );
                records
            }
            Err(e) => {
                warn!(
                    "Results calendar {} unavailable: {}",
                    self.calendar_path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn read_matching(&self, wanted: &HashSet<String>) -> anyhow::Result<Vec<FundamentalsRecord>> {
        let mut rdr = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_path(&self.calendar_path)?;

        let headers = rdr.headers()?.clone();
        let symbol_index = headers
            .iter()
            .position(|h| h == self.symbol_column)
            .or_else(|| {
                headers
                    .iter()
                    .position(|h| h.eq_ignore_ascii_case(&self.symbol_column))
            })
            .ok_or_else(|| anyhow::anyhow!("no '{}' column", self.symbol_column))?;

        let mut records = Vec::new();
        for (index, result) in rdr.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable calendar row {}: {}", index + 2, e);
                    continue;
                }
            };

            let symbol = record
                .get(symbol_index)
                .map(|s| s.trim().to_uppercase())
                .unwrap_or_default();
            if wanted.contains(&symbol) {
                records.push(to_record(&headers, &record, symbol_index, symbol));
            }
        }

        Ok(records)
    }
}

fn to_record(
    headers: &StringRecord,
    record: &StringRecord,
    symbol_index: usize,
    symbol: String,
) -> FundamentalsRecord {
    let fields = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let value = if i == symbol_index {
                symbol.clone()
            } else {
                let raw = record.get(i).unwrap_or_default();
                if header.contains("Date") {
                    reformat_date(raw)
                } else {
                    raw.to_string()
                }
            };
            (readable_label(header).to_string(), value)
        })
        .collect();

    FundamentalsRecord { symbol, fields }
}

/// User-facing label for a calendar header
pub fn readable_label(header: &str) -> &str {
    COLUMN_LABELS
        .iter()
        .find(|(raw, _)| *raw == header)
        .map(|(_, label)| *label)
        .unwrap_or(header)
}

/// `05/02/2025` -> `05 Feb 2025`. Anything that does not parse comes back unchanged.
pub fn reformat_date(value: &str) -> String {
    let trimmed = value.trim();
    INPUT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(|date| date.format(OUTPUT_DATE_FORMAT).to_string())
        .unwrap_or_else(|| value.to_string())
}

//! Renderings of mapped symbols.
//!
//! The grouped format is pasted straight into a watchlist import box that
//! expects `###NAME(count),EXCH:TICKER,...`; its punctuation must not change.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::MappedSymbol;

/// Output layouts for a mapping result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// `TICKER:INDUSTRY` per line
    #[default]
    Flat,
    /// Industry groups on one line, ready for watchlist import
    Grouped,
    /// Prefixed tickers only
    Symbols,
}

impl OutputFormat {
    pub fn render(self, mapped: &[MappedSymbol], prefix: &str) -> String {
        match self {
            OutputFormat::Flat => format_flat(mapped),
            OutputFormat::Grouped => format_grouped(mapped, prefix),
            OutputFormat::Symbols => format_symbols(mapped, prefix),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(OutputFormat::Flat),
            "grouped" | "tv" | "tradingview" => Ok(OutputFormat::Grouped),
            "symbols" => Ok(OutputFormat::Symbols),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Flat => "flat",
            OutputFormat::Grouped => "grouped",
            OutputFormat::Symbols => "symbols",
        };
        f.write_str(name)
    }
}

/// Build the ticker decoration for an exchange; `NSE` and `NSE:` both give `NSE:`
pub fn exchange_prefix(exchange: &str) -> String {
    let exchange = exchange.trim().trim_end_matches(':');
    if exchange.is_empty() {
        String::new()
    } else {
        format!("{}:", exchange.to_uppercase())
    }
}

pub fn format_flat(mapped: &[MappedSymbol]) -> String {
    mapped
        .iter()
        .map(|m| format!("{}:{}", m.symbol, m.industry))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_grouped(mapped: &[MappedSymbol], prefix: &str) -> String {
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for m in mapped {
        groups.entry(m.industry.as_str()).or_default().push(m.symbol.as_str());
    }

    groups
        .into_iter()
        .map(|(industry, mut symbols)| {
            symbols.sort_unstable();
            let mut group = format!("###{}({})", industry, symbols.len());
            for symbol in symbols {
                group.push(',');
                group.push_str(prefix);
                group.push_str(symbol);
            }
            group
        })
        .collect::<Vec<_>>()
        .join(",")
}

pub fn format_symbols(mapped: &[MappedSymbol], prefix: &str) -> String {
    mapped
        .iter()
        .map(|m| format!("{}{}", prefix, m.symbol))
        .collect::<Vec<_>>()
        .join(",")
}

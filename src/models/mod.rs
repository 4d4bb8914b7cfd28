use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Largest batch accepted by the mapper unless configured otherwise
pub const DEFAULT_MAX_BATCH_SIZE: usize = 900;

/// Exchange used to decorate tickers in grouped output
pub const DEFAULT_EXCHANGE: &str = "NSE";

pub const DEFAULT_MAPPING_PATH: &str = "data/industry_mapping.csv";
pub const DEFAULT_CALENDAR_PATH: &str = "data/results_calendar.csv";

/// One resolved ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedSymbol {
    pub symbol: String,
    pub industry: String,
}

impl MappedSymbol {
    pub fn new(symbol: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            industry: industry.into(),
        }
    }
}

/// Outcome of mapping one batch of raw symbol text.
///
/// Every normalized ticker lands in exactly one of the two lists, in the
/// order it first appeared in the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingResult {
    pub mapped: Vec<MappedSymbol>,
    pub unmapped: Vec<String>,
}

impl MappingResult {
    pub fn total(&self) -> usize {
        self.mapped.len() + self.unmapped.len()
    }

    pub fn industry_of(&self, symbol: &str) -> Option<&str> {
        self.mapped
            .iter()
            .find(|m| m.symbol == symbol)
            .map(|m| m.industry.as_str())
    }
}

/// One results-calendar row for a requested symbol, with readable labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundamentalsRecord {
    pub symbol: String,
    pub fields: Vec<(String, String)>,
}

impl FundamentalsRecord {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }
}

/// Database statistics for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub total_symbols: usize,
    pub total_industries: usize,
    pub referenced_industries: usize,
}

/// What to do when the default table cannot be loaded at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadPolicy {
    /// Fail construction
    #[default]
    Strict,
    /// Start unloaded and report the problem when mapping is attempted
    Lenient,
}

impl std::str::FromStr for LoadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(LoadPolicy::Strict),
            "lenient" => Ok(LoadPolicy::Lenient),
            other => Err(format!("unknown load policy '{}' (expected strict or lenient)", other)),
        }
    }
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub mapping_path: PathBuf,
    pub industries_path: Option<PathBuf>,
    pub calendar_path: PathBuf,
    pub max_batch_size: usize,
    pub exchange: String,
    pub load_policy: LoadPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mapping_path: PathBuf::from(DEFAULT_MAPPING_PATH),
            industries_path: None,
            calendar_path: PathBuf::from(DEFAULT_CALENDAR_PATH),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            exchange: DEFAULT_EXCHANGE.to_string(),
            load_policy: LoadPolicy::Strict,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if it exists
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup; unset or unparseable
    /// values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        Config {
            mapping_path: lookup("MAPPING_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.mapping_path),
            industries_path: lookup("INDUSTRIES_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            calendar_path: lookup("RESULTS_CALENDAR_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.calendar_path),
            max_batch_size: lookup("MAX_BATCH_SIZE")
                .and_then(|v| v.trim().parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.max_batch_size),
            exchange: lookup("EXCHANGE_PREFIX")
                .map(|v| v.trim().trim_end_matches(':').to_uppercase())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.exchange),
            load_policy: lookup("LOAD_POLICY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.load_policy),
        }
    }

    /// Exchange decoration for output tickers, e.g. `NSE:`
    pub fn exchange_prefix(&self) -> String {
        crate::formatter::exchange_prefix(&self.exchange)
    }
}

use std::collections::HashSet;

/// Exchange decorations recognized on input, e.g. `NSE:RELIANCE`
pub const KNOWN_EXCHANGES: &[&str] = &["NSE", "BSE", "NASDAQ", "NYSE", "AMEX"];

/// Turns a pasted block of symbols into canonical tickers.
#[derive(Debug, Clone)]
pub struct SymbolNormalizer {
    exchanges: Vec<String>,
}

impl Default for SymbolNormalizer {
    fn default() -> Self {
        Self {
            exchanges: KNOWN_EXCHANGES.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl SymbolNormalizer {
    /// Default exchanges plus `exchange` (with or without trailing colon)
    pub fn with_exchange(exchange: &str) -> Self {
        let mut normalizer = Self::default();
        let exchange = exchange.trim().trim_end_matches(':').to_uppercase();
        if !exchange.is_empty() && !normalizer.exchanges.contains(&exchange) {
            normalizer.exchanges.push(exchange);
        }
        normalizer
    }

    /// Split on commas, semicolons and newlines, uppercase, strip a known
    /// exchange prefix and drop duplicates keeping the first occurrence.
    pub fn normalize(&self, raw: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        raw.split(|c: char| matches!(c, ',' | ';' | '\n' | '\r'))
            .filter_map(|token| self.canonical(token))
            .filter(|ticker| seen.insert(ticker.clone()))
            .collect()
    }

    /// Canonical form of a single token, `None` if nothing is left
    pub fn canonical(&self, token: &str) -> Option<String> {
        let upper = token.trim().to_uppercase();
        let bare = self.strip_exchange(&upper).trim();
        if bare.is_empty() {
            None
        } else {
            Some(bare.to_string())
        }
    }

    // Repeated decorations (`NSE:NSE:TCS`) are all removed so that
    // normalizing twice gives the same answer.
    fn strip_exchange<'a>(&self, mut token: &'a str) -> &'a str {
        while let Some((exchange, rest)) = token.split_once(':') {
            if !self.exchanges.iter().any(|e| e == exchange.trim()) {
                break;
            }
            token = rest.trim_start();
        }
        token
    }
}

/// Normalize with the default exchange set
pub fn normalize(raw: &str) -> Vec<String> {
    SymbolNormalizer::default().normalize(raw)
}

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use tracing::{debug, error, info, warn};

use crate::error::{MapperError, Result};
use crate::loader::{load_catalog, LookupTable};
use crate::models::{Config, DatabaseStats, LoadPolicy, MappedSymbol, MappingResult};
use crate::normalizer::SymbolNormalizer;

/// Resolves batches of symbols against the currently loaded lookup table.
///
/// The table sits behind an `Arc` that is replaced as a whole on reload, so a
/// batch always sees one complete table.
pub struct IndustryMapper {
    table: RwLock<Option<Arc<LookupTable>>>,
    normalizer: SymbolNormalizer,
    max_batch_size: usize,
    mapping_path: PathBuf,
    industries_path: Option<PathBuf>,
}

impl IndustryMapper {
    /// Initialize the mapper from configuration, honouring its load policy
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_policy(config, config.load_policy)
    }

    pub fn with_policy(config: &Config, policy: LoadPolicy) -> Result<Self> {
        let mapper = Self::unloaded(config);

        match mapper.reload() {
            Ok(_) => Ok(mapper),
            Err(e) if policy == LoadPolicy::Lenient => {
                warn!("Starting without an industry mapping database: {}", e);
                Ok(mapper)
            }
            Err(e) => {
                error!("Failed to load industry mapping database: {}", e);
                Err(e)
            }
        }
    }

    /// A mapper with no table; mapping fails until something is loaded
    pub fn unloaded(config: &Config) -> Self {
        Self {
            table: RwLock::new(None),
            normalizer: SymbolNormalizer::with_exchange(&config.exchange),
            max_batch_size: config.max_batch_size,
            mapping_path: config.mapping_path.clone(),
            industries_path: config.industries_path.clone(),
        }
    }

    /// Wrap an already built table
    pub fn from_table(table: LookupTable, config: &Config) -> Self {
        let mapper = Self::unloaded(config);
        mapper.swap(table);
        mapper
    }

    /// Re-read the configured table files and swap them in
    pub fn reload(&self) -> Result<Arc<LookupTable>> {
        let table = LookupTable::from_path(&self.mapping_path, self.industries_path.as_deref())?;
        Ok(self.swap(table))
    }

    /// Load a different mapping file in place of the current table
    pub fn load_path(&self, mapping_path: &Path) -> Result<Arc<LookupTable>> {
        let table = LookupTable::from_path(mapping_path, self.industries_path.as_deref())?;
        Ok(self.swap(table))
    }

    /// Replace the table with a user upload. The upload is checked against
    /// the declared category list when one is in use, read from the
    /// configured file if nothing is loaded yet. On failure the current
    /// table stays in place.
    pub fn upload(&self, bytes: &[u8], label: &str) -> Result<Arc<LookupTable>> {
        let catalog = match self.snapshot().and_then(|t| t.declared_catalog().cloned()) {
            Some(catalog) => Some(catalog),
            None => self.industries_path.as_deref().map(load_catalog).transpose()?,
        };
        let table = LookupTable::from_bytes(bytes, label, catalog)?;
        Ok(self.swap(table))
    }

    fn swap(&self, table: LookupTable) -> Arc<LookupTable> {
        let table = Arc::new(table);
        let mut guard = self.table.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(Arc::clone(&table));
        table
    }

    /// The table currently in use, if any
    pub fn snapshot(&self) -> Option<Arc<LookupTable>> {
        self.table
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn loaded(&self) -> Result<Arc<LookupTable>> {
        self.snapshot().ok_or(MapperError::NotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_some()
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Clean and validate input symbols
    pub fn clean_symbols(&self, raw: &str) -> Vec<String> {
        self.normalizer.normalize(raw)
    }

    /// Map raw symbol text to industries, returning mapped and unmapped symbols
    pub fn map_symbols(&self, raw: &str) -> Result<MappingResult> {
        let table = self.loaded()?;
        let symbols = self.clean_symbols(raw);
        self.map_with(&table, &symbols)
    }

    /// Map symbols that are already canonical
    pub fn map_normalized(&self, symbols: &[String]) -> Result<MappingResult> {
        let table = self.loaded()?;
        self.map_with(&table, symbols)
    }

    fn map_with(&self, table: &LookupTable, symbols: &[String]) -> Result<MappingResult> {
        if symbols.len() > self.max_batch_size {
            return Err(MapperError::BatchTooLarge {
                count: symbols.len(),
                max: self.max_batch_size,
            });
        }

        let mut result = MappingResult::default();
        for symbol in symbols {
            match table.industry_of(symbol) {
                Some(industry) => result.mapped.push(MappedSymbol::new(symbol.as_str(), industry)),
                None => result.unmapped.push(symbol.clone()),
            }
        }

        debug!(
            "Mapped {} of {} symbols ({} unmapped)",
            result.mapped.len(),
            symbols.len(),
            result.unmapped.len()
        );
        Ok(result)
    }

    /// Get list of all available industries in the database
    pub fn available_industries(&self) -> Result<Vec<String>> {
        Ok(self.loaded()?.industries())
    }

    /// Get statistics about the mapping database
    pub fn stats(&self) -> Result<DatabaseStats> {
        Ok(self.loaded()?.stats())
    }

    /// Known tickers that look like `symbol`, best match first
    pub fn suggest(&self, symbol: &str, limit: usize) -> Vec<String> {
        let Some(table) = self.snapshot() else {
            return Vec::new();
        };
        let Some(query) = self.normalizer.canonical(symbol) else {
            return Vec::new();
        };

        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &str)> = table
            .symbols()
            .filter(|candidate| *candidate != query)
            .filter_map(|candidate| {
                matcher
                    .fuzzy_match(candidate, &query)
                    .map(|score| (score, candidate))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, candidate)| candidate.to_string())
            .collect()
    }
}

impl std::fmt::Debug for IndustryMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndustryMapper")
            .field("loaded", &self.snapshot().map(|t| t.source().to_string()))
            .field("max_batch_size", &self.max_batch_size)
            .finish()
    }
}

/// Log a one-line summary of the loaded table
pub fn log_stats(mapper: &IndustryMapper) {
    match mapper.stats() {
        Ok(stats) => info!(
            "Database loaded with {} symbols across {} industries ({} in use)",
            stats.total_symbols, stats.total_industries, stats.referenced_industries
        ),
        Err(e) => warn!("{}", e),
    }
}

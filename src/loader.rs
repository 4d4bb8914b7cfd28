use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{MapperError, Result};
use crate::models::DatabaseStats;

/// Columns every mapping table must carry
pub const REQUIRED_COLUMNS: [&str; 2] = ["symbol", "industry"];

#[derive(Debug, Deserialize)]
struct MappingRow {
    symbol: String,
    industry: String,
}

/// Symbol to industry lookup plus the industry catalog it was checked against.
///
/// Built in one go and never modified afterwards; a reload produces a new
/// table.
#[derive(Debug, Clone)]
pub struct LookupTable {
    mapping: HashMap<String, String>,
    catalog: BTreeSet<String>,
    declared_catalog: bool,
    source: String,
}

impl LookupTable {
    /// Load the mapping CSV, and the headerless category list when given
    pub fn from_path(mapping_path: &Path, catalog_path: Option<&Path>) -> Result<Self> {
        let source = mapping_path.display().to_string();
        let file = open(mapping_path)?;
        let mapping = parse_mapping(file, &source)?;
        let catalog = catalog_path.map(load_catalog).transpose()?;

        let table = Self::from_parts(mapping, catalog, source)?;
        info!(
            "Loaded {} symbols across {} industries from {}",
            table.total_symbols(),
            table.total_industries(),
            table.source
        );
        Ok(table)
    }

    /// Parse a user-supplied upload; `catalog` is the declared category list
    /// to validate against, if one is in use.
    pub fn from_bytes(bytes: &[u8], label: &str, catalog: Option<BTreeSet<String>>) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|_| MapperError::InvalidUtf8(label.to_string()))?;
        let mapping = parse_mapping(text.as_bytes(), label)?;
        let table = Self::from_parts(mapping, catalog, label.to_string())?;
        info!(
            "Loaded {} symbols across {} industries from upload {}",
            table.total_symbols(),
            table.total_industries(),
            label
        );
        Ok(table)
    }

    /// Assemble a table from an already parsed mapping, running the
    /// catalog consistency check.
    pub fn from_parts(
        mapping: HashMap<String, String>,
        catalog: Option<BTreeSet<String>>,
        source: String,
    ) -> Result<Self> {
        if mapping.is_empty() {
            return Err(MapperError::EmptyTable(source));
        }

        let declared_catalog = catalog.is_some();
        let catalog = match catalog {
            Some(catalog) => {
                let unknown: BTreeSet<&String> =
                    mapping.values().filter(|i| !catalog.contains(*i)).collect();
                if !unknown.is_empty() {
                    return Err(MapperError::UnknownIndustries(
                        unknown.into_iter().cloned().collect(),
                    ));
                }
                catalog
            }
            None => mapping.values().cloned().collect(),
        };

        if catalog.is_empty() {
            return Err(MapperError::EmptyTable(source));
        }

        Ok(Self {
            mapping,
            catalog,
            declared_catalog,
            source,
        })
    }

    pub fn industry_of(&self, symbol: &str) -> Option<&str> {
        self.mapping.get(symbol).map(String::as_str)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.mapping.keys().map(String::as_str)
    }

    /// Sorted industry catalog
    pub fn industries(&self) -> Vec<String> {
        self.catalog.iter().cloned().collect()
    }

    /// The declared category list, if the table was loaded with one
    pub fn declared_catalog(&self) -> Option<&BTreeSet<String>> {
        self.declared_catalog.then_some(&self.catalog)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn total_symbols(&self) -> usize {
        self.mapping.len()
    }

    pub fn total_industries(&self) -> usize {
        self.catalog.len()
    }

    /// Number of catalog industries used by at least one symbol
    pub fn referenced_industries(&self) -> usize {
        self.mapping.values().collect::<BTreeSet<_>>().len()
    }

    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            total_symbols: self.total_symbols(),
            total_industries: self.total_industries(),
            referenced_industries: self.referenced_industries(),
        }
    }
}

/// Read a headerless, single-column industry list
pub fn load_catalog(path: &Path) -> Result<BTreeSet<String>> {
    let source = path.display().to_string();
    let file = open(path)?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);

    let mut catalog = BTreeSet::new();
    for result in rdr.records() {
        let record = result.map_err(|e| csv_error(&source, e))?;
        if let Some(industry) = record.get(0).filter(|v| !v.is_empty()) {
            catalog.insert(industry.to_string());
        }
    }

    debug!("Read {} industry categories from {}", catalog.len(), source);
    Ok(catalog)
}

fn open(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(MapperError::NotFound(path.to_path_buf()));
    }
    File::open(path).map_err(|e| MapperError::Read {
        source_name: path.display().to_string(),
        source: e,
    })
}

// io failures surfacing through the csv reader (e.g. a directory path) are
// read errors, not parse errors
fn csv_error(source_name: &str, err: csv::Error) -> MapperError {
    if err.is_io_error() {
        MapperError::Read {
            source_name: source_name.to_string(),
            source: err.into(),
        }
    } else {
        MapperError::Csv {
            source_name: source_name.to_string(),
            source: err,
        }
    }
}

/// Parse `symbol,industry` rows; symbols are uppercased, blank rows skipped.
fn parse_mapping<R: Read>(reader: R, source_name: &str) -> Result<HashMap<String, String>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = rdr.headers().map_err(|e| csv_error(source_name, e))?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(MapperError::MissingColumns(missing));
    }

    let mut mapping = HashMap::new();
    for (index, result) in rdr.deserialize::<MappingRow>().enumerate() {
        // header is line 1
        let line = index + 2;
        let row = result.map_err(|e| csv_error(source_name, e))?;

        if row.symbol.is_empty() || row.industry.is_empty() {
            warn!("Skipping incomplete row {} in {}", line, source_name);
            continue;
        }

        let symbol = row.symbol.to_uppercase();
        if let Some(previous) = mapping.insert(symbol.clone(), row.industry) {
            warn!(
                "Duplicate symbol {} on line {} of {} (replacing '{}')",
                symbol, line, source_name, previous
            );
        }
    }

    Ok(mapping)
}

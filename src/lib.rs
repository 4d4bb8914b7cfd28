//! Map stock ticker symbols to industry categories and render the result for
//! watchlist import.

pub mod cli;
pub mod error;
pub mod formatter;
pub mod fundamentals;
pub mod loader;
pub mod mapper;
pub mod models;
pub mod normalizer;

pub use error::{MapperError, Result};
pub use formatter::{format_flat, format_grouped, format_symbols, OutputFormat};
pub use fundamentals::FundamentalsJoiner;
pub use loader::LookupTable;
pub use mapper::IndustryMapper;
pub use models::{Config, DatabaseStats, FundamentalsRecord, LoadPolicy, MappedSymbol, MappingResult};
pub use normalizer::{normalize, SymbolNormalizer};

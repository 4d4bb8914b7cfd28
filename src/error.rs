use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading lookup tables or mapping a batch of symbols.
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("Industry mapping database not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Error reading industry database {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing industry database {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("Uploaded table {0} is not valid UTF-8 text")]
    InvalidUtf8(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Industries missing from the category list: {}", .0.join(", "))]
    UnknownIndustries(Vec<String>),

    #[error("Industry mapping database {0} contains no usable rows")]
    EmptyTable(String),

    #[error("No mapping database loaded")]
    NotLoaded,

    #[error("Maximum {max} symbols allowed per batch (got {count})")]
    BatchTooLarge { count: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, MapperError>;

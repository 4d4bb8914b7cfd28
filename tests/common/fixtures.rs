//! Table files written to a temporary directory for each test

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use stock_industry_mapper::{Config, IndustryMapper, LoadPolicy};

pub const MAPPING_CSV: &str = "\
symbol,industry
RELIANCE,Refineries
TCS,IT - Software
infy,IT - Software
HDFCBANK,Banks - Private
ICICIBANK,Banks - Private
WIPRO,IT - Software
";

pub const INDUSTRIES_CSV: &str = "\
Refineries
IT - Software
Banks - Private
Banks - Public
";

pub const CALENDAR_CSV: &str = "\
Stock,Quarterly Results Date,Sales Growth %,Profit Growth %
TCS,09/01/2025,5.6,12.0
INFY,16/01/2025,7.6,11.4
SBIN,TBA,9.3,84.3
";

/// Mapping, category and calendar files in a scratch directory
pub struct TestTables {
    pub dir: TempDir,
}

impl TestTables {
    pub fn new() -> Self {
        let tables = Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        };
        tables.write("industry_mapping.csv", MAPPING_CSV);
        tables.write("industries.csv", INDUSTRIES_CSV);
        tables.write("results_calendar.csv", CALENDAR_CSV);
        tables
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn config(&self) -> Config {
        Config {
            mapping_path: self.path("industry_mapping.csv"),
            industries_path: Some(self.path("industries.csv")),
            calendar_path: self.path("results_calendar.csv"),
            load_policy: LoadPolicy::Strict,
            ..Config::default()
        }
    }

    pub fn mapper(&self) -> IndustryMapper {
        IndustryMapper::new(&self.config()).expect("fixture tables load")
    }
}

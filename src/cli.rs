use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::formatter::OutputFormat;
use crate::fundamentals::FundamentalsJoiner;
use crate::mapper::{log_stats, IndustryMapper};
use crate::models::{Config, LoadPolicy};
use crate::normalizer::SymbolNormalizer;

/// Map stock symbols to industries
#[derive(Debug, Parser)]
#[command(name = "stock-mapper")]
#[command(version = "0.1.0")]
#[command(about = "Map stock symbols to industry categories and build watchlist import strings")]
#[command(long_about = "
Reads a block of stock symbols (comma, semicolon or newline separated, with or
without an exchange prefix such as NSE:), looks each one up in the industry
mapping table and prints the result.

Examples:
  stock-mapper map RELIANCE,TCS,INFY
  stock-mapper map --input watchlist.txt --format grouped
  stock-mapper fundamentals TCS INFY --json
")]
pub struct Args {
    /// Symbol to industry table (CSV with `symbol` and `industry` columns)
    #[arg(long, global = true)]
    pub mapping: Option<PathBuf>,

    /// Headerless list of valid industries; mapped industries must appear in it
    #[arg(long, global = true)]
    pub industries: Option<PathBuf>,

    /// Results calendar CSV used by `fundamentals`
    #[arg(long, global = true)]
    pub calendar: Option<PathBuf>,

    /// Largest number of symbols accepted in one batch
    #[arg(long, global = true)]
    pub max_batch_size: Option<usize>,

    /// Exchange prefix added to tickers in grouped output
    #[arg(long, global = true)]
    pub exchange: Option<String>,

    /// Start even when the mapping table cannot be loaded
    #[arg(long, global = true)]
    pub lenient: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Map symbols to industries
    Map {
        /// Symbols; read from --input or stdin when omitted
        symbols: Vec<String>,

        /// File containing symbols
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        /// flat, grouped or symbols
        #[arg(long, short = 'f', default_value_t = OutputFormat::Flat)]
        format: OutputFormat,

        /// Offer up to N similar known symbols for each unmapped one
        #[arg(long, default_value_t = 0)]
        suggest: usize,
    },
    /// Show table statistics
    Stats,
    /// List the industry catalog
    Industries,
    /// Show results calendar rows for symbols
    Fundamentals {
        symbols: Vec<String>,

        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

impl Args {
    /// Environment configuration with command line overrides applied
    pub fn config(&self, mut config: Config) -> Config {
        if let Some(path) = &self.mapping {
            config.mapping_path = path.clone();
        }
        if let Some(path) = &self.industries {
            config.industries_path = Some(path.clone());
        }
        if let Some(path) = &self.calendar {
            config.calendar_path = path.clone();
        }
        if let Some(max) = self.max_batch_size.filter(|&n| n > 0) {
            config.max_batch_size = max;
        }
        if let Some(exchange) = &self.exchange {
            config.exchange = exchange.trim().trim_end_matches(':').to_uppercase();
        }
        if self.lenient {
            config.load_policy = LoadPolicy::Lenient;
        }
        config
    }
}

/// Execute one command. Results go to `out`, diagnostics to `err`.
pub fn run(
    args: &Args,
    config: &Config,
    stdin: &mut dyn Read,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    match &args.command {
        Command::Map {
            symbols,
            input,
            format,
            suggest,
        } => {
            let mapper = load_mapper(config)?;
            let raw = read_symbols(symbols, input.as_ref(), stdin)?;
            if raw.trim().is_empty() {
                return Err(anyhow!("Please enter some symbols to process."));
            }

            let result = mapper.map_symbols(&raw)?;
            info!(
                "Processed {} symbols: {} mapped, {} unmapped",
                result.total(),
                result.mapped.len(),
                result.unmapped.len()
            );

            if result.mapped.is_empty() {
                writeln!(err, "No valid symbols found.")?;
            } else {
                writeln!(out, "{}", format.render(&result.mapped, &config.exchange_prefix()))?;
            }

            if !result.unmapped.is_empty() {
                writeln!(
                    err,
                    "Invalid or unmapped symbols ({}): {}",
                    result.unmapped.len(),
                    result.unmapped.join(", ")
                )?;
                if *suggest > 0 {
                    for symbol in &result.unmapped {
                        let candidates = mapper.suggest(symbol, *suggest);
                        if !candidates.is_empty() {
                            writeln!(err, "  {}: did you mean {}?", symbol, candidates.join(", "))?;
                        }
                    }
                }
            }
        }
        Command::Stats => {
            let mapper = load_mapper(config)?;
            let stats = mapper.stats()?;
            writeln!(out, "symbols: {}", stats.total_symbols)?;
            writeln!(out, "industries: {}", stats.total_industries)?;
            writeln!(out, "industries in use: {}", stats.referenced_industries)?;
        }
        Command::Industries => {
            let mapper = load_mapper(config)?;
            for industry in mapper.available_industries()? {
                writeln!(out, "{}", industry)?;
            }
        }
        Command::Fundamentals {
            symbols,
            input,
            json,
        } => {
            let raw = read_symbols(symbols, input.as_ref(), stdin)?;
            let normalizer = SymbolNormalizer::with_exchange(&config.exchange);
            let symbols = normalizer.normalize(&raw);
            let records = FundamentalsJoiner::new(&config.calendar_path)
                .with_normalizer(normalizer)
                .fundamentals(&symbols);

            if *json {
                serde_json::to_writer_pretty(&mut *out, &records)?;
                writeln!(out)?;
            } else if records.is_empty() {
                writeln!(err, "No results calendar entries found.")?;
            } else {
                for record in &records {
                    let line = record
                        .fields
                        .iter()
                        .map(|(label, value)| format!("{}: {}", label, value))
                        .collect::<Vec<_>>()
                        .join(" | ");
                    writeln!(out, "{}", line)?;
                }
            }
        }
    }

    Ok(())
}

fn load_mapper(config: &Config) -> Result<IndustryMapper> {
    let mapper = IndustryMapper::new(config).with_context(|| {
        format!(
            "Failed to load industry mapping database from {}",
            config.mapping_path.display()
        )
    })?;
    log_stats(&mapper);
    Ok(mapper)
}

fn read_symbols(symbols: &[String], input: Option<&PathBuf>, stdin: &mut dyn Read) -> Result<String> {
    if !symbols.is_empty() {
        return Ok(symbols.join(","));
    }
    if let Some(path) = input {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read symbols from {}", path.display()));
    }
    let mut raw = String::new();
    stdin.read_to_string(&mut raw).context("Failed to read symbols from stdin")?;
    Ok(raw)
}

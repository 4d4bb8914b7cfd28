//! End-to-end runs of the command line front end

use clap::Parser;
use pretty_assertions::assert_eq;
use test_log::test;

use stock_industry_mapper::cli::{run, Args};
use stock_industry_mapper::Config;

use crate::common::fixtures::TestTables;

struct Output {
    stdout: String,
    stderr: String,
}

fn run_cli(tables: &TestTables, argv: &[&str], stdin: &str) -> anyhow::Result<Output> {
    let mut full = vec!["stock-mapper"];
    full.extend_from_slice(argv);
    let args = Args::try_parse_from(full)?;
    let config = args.config(tables.config());

    let mut input = stdin.as_bytes();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    run(&args, &config, &mut input, &mut stdout, &mut stderr)?;

    Ok(Output {
        stdout: String::from_utf8(stdout)?,
        stderr: String::from_utf8(stderr)?,
    })
}

#[test]
fn test_map_grouped_from_args() {
    let tables = TestTables::new();
    let output = run_cli(&tables, &["map", "--format", "grouped", "wipro,TCS,HDFCBANK,NOPE"], "").unwrap();

    assert_eq!(
        output.stdout,
        "###Banks - Private(1),NSE:HDFCBANK,###IT - Software(2),NSE:TCS,NSE:WIPRO\n"
    );
    assert_eq!(output.stderr, "Invalid or unmapped symbols (1): NOPE\n");
}

#[test]
fn test_map_flat_from_stdin() {
    let tables = TestTables::new();
    let output = run_cli(&tables, &["map"], "reliance\nNSE:INFY\n").unwrap();
    assert_eq!(output.stdout, "RELIANCE:Refineries\nINFY:IT - Software\n");
    assert!(output.stderr.is_empty());
}

#[test]
fn test_map_with_exchange_override_and_suggestions() {
    let tables = TestTables::new();
    let output = run_cli(
        &tables,
        &["map", "-f", "symbols", "--exchange", "bse", "--suggest", "2", "TCS,WIPR"],
        "",
    )
    .unwrap();

    assert_eq!(output.stdout, "BSE:TCS\n");
    assert!(output.stderr.contains("WIPR: did you mean WIPRO"));
}

#[test]
fn test_map_rejects_empty_input_and_large_batches() {
    let tables = TestTables::new();
    let err = run_cli(&tables, &["map"], "  \n").err().unwrap();
    assert_eq!(err.to_string(), "Please enter some symbols to process.");

    let raw = (0..11).map(|i| format!("S{}", i)).collect::<Vec<_>>().join(",");
    let err = run_cli(&tables, &["map", "--max-batch-size", "10", raw.as_str()], "").err().unwrap();
    assert_eq!(err.to_string(), "Maximum 10 symbols allowed per batch (got 11)");
}

#[test]
fn test_stats_and_industries() {
    let tables = TestTables::new();
    let output = run_cli(&tables, &["stats"], "").unwrap();
    assert_eq!(output.stdout, "symbols: 6\nindustries: 4\nindustries in use: 3\n");

    let output = run_cli(&tables, &["industries"], "").unwrap();
    assert_eq!(
        output.stdout,
        "Banks - Private\nBanks - Public\nIT - Software\nRefineries\n"
    );
}

#[test]
fn test_missing_table_reports_load_failure() {
    let tables = TestTables::new();
    let missing = tables.path("nowhere.csv");
    let err = run_cli(&tables, &["stats", "--mapping", missing.to_str().unwrap()], "")
        .err()
        .unwrap();
    let message = format!("{:#}", err);
    assert!(message.starts_with("Failed to load industry mapping database"));
    assert!(message.contains("not found"));

    let err = run_cli(&tables, &["--lenient", "stats", "--mapping", missing.to_str().unwrap()], "")
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "No mapping database loaded");
}

#[test]
fn test_fundamentals_text_and_json() {
    let tables = TestTables::new();
    let output = run_cli(&tables, &["fundamentals", "NSE:TCS"], "").unwrap();
    assert_eq!(
        output.stdout,
        "Symbol: TCS | Results Date: 09 Jan 2025 | Sales Growth (YoY %): 5.6 | Profit Growth (YoY %): 12.0\n"
    );

    let output = run_cli(&tables, &["fundamentals", "--json", "WIPRO"], "").unwrap();
    assert_eq!(output.stdout.trim(), "[]");

    let output = run_cli(&tables, &["fundamentals", "WIPRO"], "").unwrap();
    assert_eq!(output.stderr, "No results calendar entries found.\n");
}

#[test]
fn test_config_defaults_come_from_environment_shape() {
    let args = Args::try_parse_from(["stock-mapper", "stats"]).unwrap();
    let config = args.config(Config::default());
    assert_eq!(config.max_batch_size, 900);
    assert_eq!(config.exchange_prefix(), "NSE:");
}

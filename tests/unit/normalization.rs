//! Symbol normalization properties

use pretty_assertions::assert_eq;
use test_log::test;

use stock_industry_mapper::{normalize, SymbolNormalizer};

#[test]
fn test_normalize_is_idempotent() {
    let inputs = [
        "AAPL, msft ;googl\nNSE:TCS",
        "b,a,b,A",
        "  \n\n ; ,",
        "NSE:NSE:reliance,BSE:infy,XYZ:abc",
    ];

    for raw in inputs {
        let once = normalize(raw);
        let twice = normalize(&once.join("\n"));
        assert_eq!(once, twice, "input: {:?}", raw);
    }
}

#[test]
fn test_order_preserving_dedup() {
    assert_eq!(normalize("B,A,B"), vec!["B", "A"]);
    assert_eq!(normalize("c\nb\na\nb\nc"), vec!["C", "B", "A"]);
}

#[test]
fn test_prefix_is_interchangeable() {
    assert_eq!(normalize("NSE:RELIANCE"), normalize("RELIANCE"));
    assert_eq!(normalize("nse:reliance, RELIANCE"), vec!["RELIANCE"]);
}

#[test]
fn test_configured_exchange_is_recognized() {
    let normalizer = SymbolNormalizer::with_exchange("LSE");
    assert_eq!(normalizer.normalize("LSE:VOD;NSE:TCS"), vec!["VOD", "TCS"]);
    assert_eq!(normalize("LSE:VOD"), vec!["LSE:VOD"]);
}

#[test]
fn test_no_size_limit_in_normalizer() {
    let raw = (0..2000).map(|i| format!("SYM{}", i)).collect::<Vec<_>>().join(",");
    assert_eq!(normalize(&raw).len(), 2000);
}

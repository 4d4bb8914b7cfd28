use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use stock_industry_mapper::cli::{self, Args};
use stock_industry_mapper::models::Config;

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for piping
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stock_industry_mapper=warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let args = Args::parse();
    let config = args.config(Config::from_env());

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();

    if let Err(e) = cli::run(&args, &config, &mut stdin.lock(), &mut stdout.lock(), &mut stderr.lock()) {
        error!("{:#}", e);
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

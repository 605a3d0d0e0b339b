//! harvester CLI entry point

use clap::Parser;
use harvester::{config::Config, pipeline::Pipeline, store::RedisStore};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "harvester")]
#[command(version, about = "Crawl a listing page for zip archives and ingest their XML records", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listing page URL (prompted for interactively when omitted)
    #[arg(short, long)]
    url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = match cli.config {
        Some(path) => Config::load(&path)?,
        None => Config::load_default()?,
    };

    let url = match cli.url {
        Some(url) => url,
        None => prompt_url(&config.pipeline.default_page_url)?,
    };

    let store = Arc::new(RedisStore::connect(&config.store)?);
    let pipeline = Pipeline::new(&config.pipeline, store)?;
    pipeline.run(&url).await?;
    Ok(())
}

/// Ask for a listing page URL on stdin, falling back to the configured
/// default on empty input.
fn prompt_url(default_url: &str) -> anyhow::Result<String> {
    print!("Enter the URL to scan (default - {}): ", default_url);
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Ok(default_url.to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

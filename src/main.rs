use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use jobscrape::{Config, JobScraper, report};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Scrape paginated job-search results into job records")]
struct Cli {
    /// JSON config with the search queries to run
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let started = Instant::now();

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    info!(
        queries = config.search_queries.len(),
        pages = config.pages_to_scrape,
        "starting scrape"
    );

    let scraper = JobScraper::new(config).context("setting up http client")?;
    let jobs = scraper.run().await;

    if let Some((first, last)) = report::posting_range(&jobs) {
        info!(%first, %last, "posting dates");
    }

    let elapsed = started.elapsed().as_secs_f64();
    match cli.format {
        Format::Text => {
            print!("{}", report::render_text(&jobs));
            println!("Scraping finished in {elapsed:.2} seconds");
        }
        Format::Json => {
            println!("{}", report::render_json(&jobs)?);
            info!("scraping finished in {elapsed:.2} seconds");
        }
    }
    Ok(())
}

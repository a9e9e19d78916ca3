use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use event_harvester::config::Config;
use event_harvester::fetch::{GooglePlacesFetcher, VenueFetcher};
use event_harvester::ingest::Reconciler;
use event_harvester::logging;
use event_harvester::query;
use event_harvester::sanitize::sanitize_event_data;
use event_harvester::storage::InMemoryEventStore;

#[derive(Parser)]
#[command(name = "event-harvester")]
#[command(about = "Event venue harvester for Gauteng event listings")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch venues from Google Places, sanitize them, and reconcile into storage
    Ingest {
        /// Specific city to fetch (Johannesburg or Pretoria). Defaults to all configured cities.
        #[arg(long)]
        city: Option<String>,

        /// Maximum results per city
        #[arg(long, default_value_t = 50)]
        max_results: usize,

        /// Preview the batch without saving anything
        #[arg(long)]
        dry_run: bool,

        /// Show detailed output for each venue
        #[arg(long)]
        verbose: bool,
    },
    /// Parse a natural-language event query into structured search parameters
    ParseQuery {
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest {
            city,
            max_results,
            dry_run,
            verbose,
        } => {
            run_ingest(city, max_results, dry_run, verbose).await?;
        }
        Commands::ParseQuery { query } => {
            let params = query::parse_query(&query);
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
    }

    Ok(())
}

async fn run_ingest(
    city: Option<String>,
    max_results: usize,
    dry_run: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    if dry_run {
        println!("⚠️  DRY RUN MODE - no data will be saved");
    }

    let config = Config::load().context("failed to load config.toml")?;
    let api_key = std::env::var("GOOGLE_PLACES_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        bail!(
            "No Google Places API key configured. \
             Set GOOGLE_PLACES_API_KEY in your .env file."
        );
    }

    let fetcher = GooglePlacesFetcher::new(api_key, config)?;

    println!("🔄 Fetching event venues from Google Places API...");
    let venues = match &city {
        Some(city) => fetcher.fetch_venues(city, max_results).await?,
        None => fetcher.fetch_all_cities(max_results).await?,
    };
    println!("Fetched {} venues from API", venues.len());

    if verbose {
        for venue in &venues {
            println!("{}", describe_venue(venue));
        }
    }

    let store = Arc::new(InMemoryEventStore::new());
    let reconciler = Reconciler::new(store);
    let stats = reconciler.ingest(&venues, dry_run).await;

    println!();
    println!("{}", "=".repeat(50));
    println!("INGESTION COMPLETE");
    println!("{}", "=".repeat(50));
    println!("  Created: {}", stats.created);
    println!("  Updated: {}", stats.updated);
    println!("  Skipped: {}", stats.skipped);
    if stats.errors > 0 {
        println!("  Errors:  {}", stats.errors);
    }
    println!("  Total processed: {}", stats.total_processed());

    if dry_run {
        println!("\nDRY RUN - no data was actually saved");
    }

    info!(
        created = stats.created,
        updated = stats.updated,
        skipped = stats.skipped,
        errors = stats.errors,
        "Ingest command finished"
    );
    Ok(())
}

/// Verbose per-venue line, shown as the pipeline will store it rather than
/// as the raw API response delivered it.
fn describe_venue(venue: &serde_json::Value) -> String {
    let sanitized = sanitize_event_data(venue);
    let title = sanitized.title.unwrap_or_else(|| "Unknown".to_string());
    let city = sanitized.city.unwrap_or_else(|| "Unknown".to_string());
    format!("  Processing: {} ({})", title, city)
}

use anyhow::Result;
use chrono::Local;
use std::time::Duration;
use tracing::{info, warn};

use otodom_scraper::crawler::{BatchScraper, OtodomSource};
use otodom_scraper::report::print_report;
use otodom_scraper::storage::OutputStore;
use otodom_scraper::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("otodom_scraper=info".parse()?),
        )
        .init();

    let config = AppConfig::from_env()?;
    info!(
        region = %config.scraper.region,
        max_pages = config.scraper.max_pages,
        delay_ms = config.scraper.delay_ms,
        "Starting otodom scraper"
    );

    let store = OutputStore::new(&config.output);
    store.ensure_dirs()?;

    let source = OtodomSource::new(&config.scraper)?;
    let scraper = BatchScraper::new(source, Duration::from_millis(config.scraper.delay_ms));
    let listings = scraper.scrape_all(config.scraper.max_pages).await;

    if listings.is_empty() {
        warn!("Scrape finished without any listings");
        println!("Nie udało się pobrać żadnych ogłoszeń. Sprawdź połączenie lub strukturę strony.");
        return Ok(());
    }

    let saved = store.save_run(&listings, Local::now())?;
    println!("Zapisano {} ogłoszeń:", listings.len());
    println!("   - CSV:  {}", saved.csv.display());
    println!("   - JSON: {}", saved.json.display());
    println!("   - Najnowsze: {}", saved.latest.display());

    print_report(&listings);

    info!(count = listings.len(), "Done");
    Ok(())
}

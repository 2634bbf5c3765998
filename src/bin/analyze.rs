//! Re-prints the report for the most recent saved run.

use anyhow::Result;

use otodom_scraper::report::DatasetReport;
use otodom_scraper::storage::{load_records, OutputStore};
use otodom_scraper::AppConfig;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("otodom_scraper=info".parse()?),
        )
        .init();

    let config = AppConfig::from_env()?;
    let store = OutputStore::new(&config.output);

    let Some(path) = store.latest_data_file()? else {
        println!(
            "Brak plików z danymi w {}. Najpierw uruchom scraper.",
            store.raw_dir().display()
        );
        return Ok(());
    };

    let records = load_records(&path)?;
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    println!("{}", DatasetReport::from_records(&records).with_source(source));
    Ok(())
}

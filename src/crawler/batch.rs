use std::time::Duration;
use tracing::{error, info};

use super::ListingSource;
use crate::models::ListingRecord;

/// Walks search pages and their listings strictly one request at a time.
pub struct BatchScraper<S: ListingSource> {
    source: S,
    delay: Duration,
}

impl<S: ListingSource> BatchScraper<S> {
    pub fn new(source: S, delay: Duration) -> Self {
        Self { source, delay }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Scrapes pages `1..=max_pages`. A listing that fails to fetch is logged
    /// and skipped; a page that yields no URLs contributes nothing.
    pub async fn scrape_all(&self, max_pages: u32) -> Vec<ListingRecord> {
        let mut listings = Vec::new();

        for page in 1..=max_pages {
            info!(page, max_pages, source = self.source.name(), "Scraping search page");

            let urls = self.source.listing_urls(page).await;
            let found = urls.len();
            let before = listings.len();

            for url in urls {
                if let Some(record) = self.scrape_listing(&url).await {
                    listings.push(record);
                }
                self.pause().await;
            }

            info!(
                page,
                found,
                scraped = listings.len() - before,
                "Finished search page"
            );
        }

        listings
    }

    /// Fetches and parses one listing, stamping it with its URL and the
    /// capture time.
    pub async fn scrape_listing(&self, url: &str) -> Option<ListingRecord> {
        match self.source.fetch(url).await {
            Ok(body) => {
                let details = self.source.parse_listing(&body);
                Some(ListingRecord::new(url, details))
            }
            Err(e) => {
                error!(url, error = %e, "Failed to scrape listing");
                None
            }
        }
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

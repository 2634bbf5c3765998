pub mod batch;
pub mod http;
pub mod otodom;

use async_trait::async_trait;

use crate::models::ListingDetails;
use crate::utils::error::Result;

pub use batch::BatchScraper;
pub use http::HttpFetcher;
pub use otodom::OtodomSource;

/// A classifieds site the batch scraper can walk.
#[async_trait]
pub trait ListingSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches a page body.
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Listing URLs found on one search-results page. Failures are logged by
    /// the implementation and reported as an empty list.
    async fn listing_urls(&self, page: u32) -> Vec<String>;

    /// Extracts listing fields from a fetched page body.
    fn parse_listing(&self, body: &str) -> ListingDetails;
}

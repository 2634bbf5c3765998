use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};
use url::Url;

use super::{HttpFetcher, ListingSource};
use crate::config::ScraperConfig;
use crate::extract::rules::parse_selector;
use crate::extract::FieldExtractor;
use crate::models::ListingDetails;
use crate::utils::error::Result;

/// Path segment every listing URL carries.
pub const LISTING_PATH_MARKER: &str = "/pl/oferta/";

/// Link selectors for search-result pages, newest layout first. Later entries
/// only run when the earlier ones find nothing.
const LINK_STRATEGIES: [&str; 3] = [
    r#"a[data-cy="listing-item-link"]"#,
    r#"[data-cy="search.listing.organic"] a[href]"#,
    r#"a[href*="/pl/oferta/"]"#,
];

pub struct OtodomSource {
    fetcher: HttpFetcher,
    base_url: Url,
    region: String,
    max_urls: usize,
    link_strategies: Vec<Selector>,
    extractor: FieldExtractor,
}

impl OtodomSource {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let link_strategies = LINK_STRATEGIES
            .iter()
            .map(|selector| parse_selector(selector))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            fetcher: HttpFetcher::new(config)?,
            base_url: Url::parse(&config.base_url)?,
            region: config.region.trim_matches('/').to_string(),
            max_urls: config.max_urls_per_page,
            link_strategies,
            extractor: FieldExtractor::new()?,
        })
    }

    pub fn search_url(&self, page: u32) -> String {
        format!(
            "{}/pl/wyniki/sprzedaz/mieszkanie/{}?page={}",
            self.base_url.as_str().trim_end_matches('/'),
            self.region,
            page
        )
    }

    /// Absolute, de-duplicated listing URLs from a search-results page, in
    /// page order and capped at the configured maximum.
    pub fn extract_listing_urls(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);

        for (index, selector) in self.link_strategies.iter().enumerate() {
            let mut seen = HashSet::new();
            let urls: Vec<String> = document
                .select(selector)
                .filter_map(|link| link.value().attr("href"))
                .filter_map(|href| self.base_url.join(href.trim()).ok())
                .map(|url| url.to_string())
                .filter(|url| url.contains(LISTING_PATH_MARKER))
                .filter(|url| seen.insert(url.clone()))
                .take(self.max_urls)
                .collect();

            if !urls.is_empty() {
                debug!(strategy = index + 1, count = urls.len(), "Listing links found");
                return urls;
            }
        }

        Vec::new()
    }
}

#[async_trait]
impl ListingSource for OtodomSource {
    fn name(&self) -> &str {
        "otodom"
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        self.fetcher.fetch(url).await
    }

    async fn listing_urls(&self, page: u32) -> Vec<String> {
        let url = self.search_url(page);

        match self.fetcher.fetch(&url).await {
            Ok(body) => {
                let urls = self.extract_listing_urls(&body);
                if urls.is_empty() {
                    warn!(page, url = %url, "No listing links found on search page");
                } else {
                    info!(page, count = urls.len(), "Collected listing URLs");
                }
                urls
            }
            Err(e) => {
                error!(page, url = %url, error = %e, "Failed to fetch search page");
                Vec::new()
            }
        }
    }

    fn parse_listing(&self, body: &str) -> ListingDetails {
        self.extractor.extract(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> OtodomSource {
        OtodomSource::new(&ScraperConfig::default()).unwrap()
    }

    #[test]
    fn test_search_url() {
        let source = source();
        assert_eq!(
            source.search_url(2),
            "https://www.otodom.pl/pl/wyniki/sprzedaz/mieszkanie/mazowieckie/warszawa?page=2"
        );
    }

    #[test]
    fn test_primary_strategy_resolves_relative_links() {
        let html = r#"
            <ul>
                <li><a data-cy="listing-item-link" href="/pl/oferta/mieszkanie-mokotow-ID4abc">A</a></li>
                <li><a data-cy="listing-item-link" href="https://www.otodom.pl/pl/oferta/kawalerka-ID4def">B</a></li>
                <li><a data-cy="listing-item-link" href="/pl/oferta/mieszkanie-mokotow-ID4abc">A again</a></li>
                <li><a href="/pl/oferta/promowane-ID4zzz">not in results</a></li>
            </ul>
        "#;
        let urls = source().extract_listing_urls(html);

        assert_eq!(
            urls,
            vec![
                "https://www.otodom.pl/pl/oferta/mieszkanie-mokotow-ID4abc".to_string(),
                "https://www.otodom.pl/pl/oferta/kawalerka-ID4def".to_string(),
            ]
        );
    }

    #[test]
    fn test_falls_back_to_organic_container() {
        let html = r#"
            <div data-cy="search.listing.organic">
                <article><a href="/pl/oferta/dwa-pokoje-ID1">x</a></article>
                <article><a href="/pl/firmy/biuro-1">agency</a></article>
            </div>
            <a href="/pl/oferta/polecane-ID9">promoted</a>
        "#;
        let urls = source().extract_listing_urls(html);

        assert_eq!(urls, vec!["https://www.otodom.pl/pl/oferta/dwa-pokoje-ID1".to_string()]);
    }

    #[test]
    fn test_falls_back_to_marker_links() {
        let html = r#"<div><a href="/pl/oferta/trzy-pokoje-ID7">x</a><a href="/pl/wyniki">y</a></div>"#;
        let urls = source().extract_listing_urls(html);

        assert_eq!(urls, vec!["https://www.otodom.pl/pl/oferta/trzy-pokoje-ID7".to_string()]);
    }

    #[test]
    fn test_caps_urls_per_page() {
        let links: String = (0..50)
            .map(|i| format!(r#"<a data-cy="listing-item-link" href="/pl/oferta/m-ID{}">m</a>"#, i))
            .collect();
        let urls = source().extract_listing_urls(&links);

        assert_eq!(urls.len(), 36);
        assert_eq!(urls[0], "https://www.otodom.pl/pl/oferta/m-ID0");
        assert_eq!(urls[35], "https://www.otodom.pl/pl/oferta/m-ID35");
        assert!(urls.iter().all(|url| url.contains(LISTING_PATH_MARKER)));
    }

    #[test]
    fn test_no_links_yields_empty() {
        let urls = source().extract_listing_urls("<html><body><p>Brak wyników</p></body></html>");
        assert!(urls.is_empty());
    }

    #[test]
    fn test_parse_listing_uses_field_extractor() {
        let details = source().parse_listing("<h1>Kawalerka</h1><p>299 000 zł</p>");
        assert_eq!(details.title.as_deref(), Some("Kawalerka"));
        assert_eq!(details.price, Some(299_000));
    }
}

// Shared fixtures: a mock otodom site and test configuration.

pub mod extraction_tests;

use otodom_scraper::config::{AppConfig, OutputConfig, ScraperConfig};
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SEARCH_PATH: &str = "/pl/wyniki/sprzedaz/mieszkanie/mazowieckie/warszawa";

pub const SEARCH_PAGE: &str = r#"<html><body>
    <div data-cy="search.listing.organic">
        <a data-cy="listing-item-link" href="/pl/oferta/mieszkanie-mokotow-IDa">A</a>
        <a data-cy="listing-item-link" href="/pl/oferta/kawalerka-wola-IDb">B</a>
        <a data-cy="listing-item-link" href="/pl/oferta/mieszkanie-mokotow-IDa">A</a>
        <a data-cy="listing-item-link" href="/pl/oferta/blad-IDc">C</a>
        <a data-cy="listing-item-link" href="/pl/firmy/biuro">agency</a>
    </div>
</body></html>"#;

pub const LISTING_A: &str = r##"<html><head><title>Otodom</title></head><body>
    <h1 data-cy="adPageAdTitle">Mieszkanie 2 pokoje Mokotów</h1>
    <strong aria-label="Cena">650 000 zł</strong>
    <a aria-label="Adres" href="#map">ul. Puławska, Mokotów, Warszawa, mazowieckie</a>
    <div>
        <p>Czynsz:</p><p>650 zł</p>
        <p>Rynek:</p><p>wtórny</p>
        <p>Rok budowy:</p><p>1998</p>
        <p>Winda:</p><p>tak</p>
        <p>Powierzchnia:</p><p>52,5 m²</p>
        <p>Liczba pokoi:</p><p>2</p>
        <p>Piętro:</p><p>3/5</p>
        <p>ID: 64821</p>
    </div>
    <div data-cy="adPageAdDescription">Słoneczne mieszkanie blisko metra.</div>
</body></html>"##;

pub const LISTING_B: &str = r##"<html><body>
    <h1 data-cy="adPageAdTitle">Kawalerka na Woli</h1>
    <strong aria-label="Cena">420 000 zł</strong>
    <a aria-label="Adres" href="#map">ul. Górczewska, Wola, Warszawa, mazowieckie</a>
    <p>Powierzchnia:</p><p>28 m²</p>
    <p>Liczba pokoi:</p><p>1</p>
</body></html>"##;

/// Serves one search page and three listings, the last of which fails.
pub async fn start_site() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_PAGE))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pl/oferta/mieszkanie-mokotow-IDa"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING_A))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pl/oferta/kawalerka-wola-IDb"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING_B))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pl/oferta/blad-IDc"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    server
}

pub fn test_scraper_config(base_url: &str) -> ScraperConfig {
    ScraperConfig {
        base_url: base_url.to_string(),
        max_pages: 2,
        delay_ms: 0,
        request_timeout: 5,
        user_agent: "otodom-scraper-test/1.0".to_string(),
        ..Default::default()
    }
}

pub fn test_app_config(base_url: &str, data_dir: &Path) -> AppConfig {
    AppConfig {
        scraper: test_scraper_config(base_url),
        output: OutputConfig {
            raw_dir: data_dir.join("raw"),
            processed_dir: data_dir.join("processed"),
            file_prefix: "otodom".to_string(),
        },
    }
}

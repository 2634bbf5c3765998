//! Best-effort field extraction from a single listing page.
//!
//! Every field is looked up independently through its own ordered list of
//! matchers. A field that cannot be found, or whose text does not convert,
//! is simply left out of the resulting [`ListingDetails`].

pub mod params;
pub mod rules;

use regex::Regex;
use scraper::Selector;
use std::collections::HashSet;
use tracing::debug;

use crate::models::ListingDetails;
use crate::utils::error::Result;
use params::{locate_block, ParameterRules};
use rules::{
    element_text, parse_decimal, parse_integer, parse_price, parse_selector, parse_text,
    parse_value, FieldRule, Matcher, PageView,
};

/// Text labels whose comma-separated values are listing features.
const FEATURE_SECTIONS: [&str; 4] = [
    "Informacje dodatkowe",
    "Wyposażenie",
    "Media",
    "Zabezpieczenia",
];

pub struct FieldExtractor {
    title: FieldRule<String>,
    price: FieldRule<i64>,
    area: FieldRule<f64>,
    rooms: FieldRule<i64>,
    floor: FieldRule<String>,
    address: FieldRule<String>,
    description: FieldRule<String>,
    feature_items: Selector,
    feature_sections: Vec<Regex>,
    parameters: ParameterRules,
}

impl FieldExtractor {
    pub fn new() -> Result<Self> {
        let feature_sections = FEATURE_SECTIONS
            .iter()
            .map(|label| Regex::new(&format!(r"{}:[ \t]*\n?[ \t]*([^\n]+)", label)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            title: FieldRule::new("title", parse_text)
                .with(Matcher::element(r#"h1[data-cy="adPageAdTitle"]"#)?)
                .with(Matcher::element("h1")?)
                .with(Matcher::attribute(r#"meta[property="og:title"]"#, "content")?)
                .with(Matcher::element("title")?),
            price: FieldRule::new("price", parse_price)
                .with(Matcher::text(r"(\d[\d ]*)\s*zł(?:[^/]|$)")?)
                .with(Matcher::text(r"PLN\s*(\d[\d ]*)")?)
                .with(Matcher::markup(r#""price"\s*:\s*"?(\d+)"#)?)
                .with(Matcher::markup(r#""totalPrice"\s*:\s*\{\s*"value"\s*:\s*(\d+)"#)?),
            area: FieldRule::new("area", parse_decimal)
                .with(Matcher::text(r"Powierzchnia:?\s*(\d+(?:[.,]\d+)?)")?)
                .with(Matcher::text(r"(\d+(?:[.,]\d+)?)\s*m(?:²|2)")?)
                .with(Matcher::markup(r#""areaInSquareMeters"\s*:\s*(\d+(?:\.\d+)?)"#)?),
            rooms: FieldRule::new("rooms", parse_integer)
                .with(Matcher::text(r"Liczba pokoi:?\s*(\d+)")?)
                .with(Matcher::text(r"(\d+)\s*(?:pokoje|pokoi|pokój)")?)
                .with(Matcher::markup(r#""rooms_num"\s*:\s*\[\s*"(\d+)""#)?),
            floor: FieldRule::new("floor", parse_value)
                .with(Matcher::text(r"Piętro:[ \t]*\n?[ \t]*([^\n]+)")?)
                .with(Matcher::text(r"\b(parter|\d+)[ \t]*piętro")?),
            address: FieldRule::new("address", parse_value)
                .with(Matcher::element(r#"a[aria-label="Adres"]"#)?)
                .with(Matcher::element(r#"[data-testid="ad-header-location"]"#)?)
                .with(Matcher::text(r"Adres:[ \t]*\n?[ \t]*([^\n]+)")?),
            description: FieldRule::new("description", parse_text)
                .with(Matcher::element(r#"[data-cy="adPageAdDescription"]"#)?)
                .with(Matcher::element(r#"[data-testid="ad-description"]"#)?)
                .with(Matcher::attribute(r#"meta[name="description"]"#, "content")?),
            feature_items: parse_selector(r#"li[data-cy="ad-details-equipment-item"]"#)?,
            feature_sections,
            parameters: ParameterRules::new()?,
        })
    }

    /// Extracts whatever fields the page offers. Never fails; a page with no
    /// recognizable content yields empty details.
    pub fn extract(&self, markup: &str) -> ListingDetails {
        let page = PageView::parse(markup);

        let mut details = ListingDetails {
            title: self.title.extract(&page),
            price: self.price.extract(&page),
            area: self.area.extract(&page),
            rooms: self.rooms.extract(&page),
            floor: self.floor.extract(&page),
            address: self.address.extract(&page),
            description: self.description.extract(&page),
            features: self.features(&page),
            ..Default::default()
        };

        match locate_block(page.text()) {
            Some(block) => self.parameters.apply(block, &mut details),
            None => debug!("Parameter block not found, skipping block fields"),
        }

        details
    }

    fn features(&self, page: &PageView<'_>) -> Option<Vec<String>> {
        let mut seen = HashSet::new();
        let mut features = Vec::new();

        let mut push = |token: &str| {
            let token = rules::collapse_whitespace(token);
            if !token.is_empty() && seen.insert(token.to_lowercase()) {
                features.push(token);
            }
        };

        for item in page.document().select(&self.feature_items) {
            push(element_text(item).as_str());
        }

        for section in &self.feature_sections {
            for caps in section.captures_iter(page.text()) {
                if let Some(values) = caps.get(1) {
                    values
                        .as_str()
                        .split(',')
                        .filter(|token| !token.trim_end().ends_with(':'))
                        .for_each(&mut push);
                }
            }
        }

        if features.is_empty() {
            None
        } else {
            Some(features)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Market;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new().unwrap()
    }

    #[test]
    fn test_price_from_currency_suffix() {
        let details = extractor().extract("<p>Cena: 350 000 zł</p>");
        assert_eq!(details.price, Some(350_000));
    }

    #[test]
    fn test_price_ignores_price_per_square_meter() {
        let details = extractor().extract("<p>12 500 zł/m²</p><p>PLN 610 000</p>");
        assert_eq!(details.price, Some(610_000));
    }

    #[test]
    fn test_price_falls_back_to_embedded_json() {
        let html = r#"<html><body><p>Zapytaj o cenę</p>
            <script id="__NEXT_DATA__">{"ad":{"target":{"Price":1},"price":"489000"}}</script>
            </body></html>"#;
        let details = extractor().extract(html);
        assert_eq!(details.price, Some(489_000));
    }

    #[test]
    fn test_price_from_total_price_key() {
        let html = r#"<script>{"totalPrice":{"value":725000,"currency":"PLN"}}</script>"#;
        let details = extractor().extract(html);
        assert_eq!(details.price, Some(725_000));
    }

    #[test]
    fn test_area_comma_decimal() {
        let details = extractor().extract("<p>52,5 m²</p>");
        assert_eq!(details.area, Some(52.5));
    }

    #[test]
    fn test_area_from_label_wins() {
        let html = "<div><p>Powierzchnia:</p><strong>48,3 m²</strong></div><p>Działka 500 m²</p>";
        let details = extractor().extract(html);
        assert_eq!(details.area, Some(48.3));
    }

    #[test]
    fn test_rooms_and_floor() {
        let html = "<div><p>Liczba pokoi:</p><strong>3</strong></div>\
                    <div><p>Piętro:</p><strong>2/4</strong></div>";
        let details = extractor().extract(html);
        assert_eq!(details.rooms, Some(3));
        assert_eq!(details.floor.as_deref(), Some("2/4"));
    }

    #[test]
    fn test_rooms_from_title_text() {
        let details = extractor().extract("<h1>Mieszkanie 2 pokoje, Mokotów</h1>");
        assert_eq!(details.rooms, Some(2));
        assert_eq!(details.title.as_deref(), Some("Mieszkanie 2 pokoje, Mokotów"));
    }

    #[test]
    fn test_title_prefers_ad_title() {
        let html = r#"<html><head><title>Otodom</title></head><body>
            <h1>Inny nagłówek</h1>
            <h1 data-cy="adPageAdTitle">  Przestronne 3 pokoje  </h1></body></html>"#;
        let details = extractor().extract(html);
        assert_eq!(details.title.as_deref(), Some("Przestronne 3 pokoje"));
    }

    #[test]
    fn test_address_selectors() {
        let html = r##"<a aria-label="Adres" href="#map">Warszawa, Ochota, ul. Grójecka</a>"##;
        let details = extractor().extract(html);
        assert_eq!(details.address.as_deref(), Some("Warszawa, Ochota, ul. Grójecka"));
    }

    #[test]
    fn test_description_from_meta() {
        let html = r#"<html><head><meta name="description" content="Mieszkanie z balkonem"></head></html>"#;
        let details = extractor().extract(html);
        assert_eq!(details.description.as_deref(), Some("Mieszkanie z balkonem"));
    }

    #[test]
    fn test_elevator_tokens() {
        let e = extractor();
        let yes = e.extract("<p>Czynsz: 400 zł</p><p>Winda: tak</p><p>ID: 1</p>");
        let no = e.extract("<p>Czynsz: 400 zł</p><p>Winda: nie</p><p>ID: 1</p>");
        let absent = e.extract("<p>Czynsz: 400 zł</p><p>Rynek: wtórny</p><p>ID: 1</p>");

        assert_eq!(yes.elevator, Some(true));
        assert_eq!(no.elevator, Some(false));
        assert_eq!(absent.elevator, None);
        assert_eq!(absent.market, Some(Market::Secondary));
    }

    #[test]
    fn test_features_are_deduplicated() {
        let html = r#"<ul>
                <li data-cy="ad-details-equipment-item">balkon</li>
                <li data-cy="ad-details-equipment-item">pralka</li>
            </ul>
            <p>Informacje dodatkowe:</p><p>balkon, piwnica, winda</p>
            <p>Wyposażenie:</p><p>pralka, lodówka, Piwnica</p>
            <p>Media:</p><p>internet, winda</p>"#;
        let details = extractor().extract(html);
        let features = details.features.unwrap();

        assert_eq!(features, vec!["balkon", "pralka", "piwnica", "winda", "lodówka", "internet"]);
        let unique: HashSet<_> = features.iter().collect();
        assert_eq!(unique.len(), features.len());
    }

    #[test]
    fn test_zero_embedded_price_is_skipped() {
        let html = r#"<script>{"price":0,"totalPrice":{"value":725000}}</script>"#;
        let details = extractor().extract(html);
        assert_eq!(details.price, Some(725_000));
    }

    #[test]
    fn test_empty_floor_and_address_do_not_take_next_label() {
        let html = "<p>Piętro:</p><p>Rynek:</p><p>wtórny</p>\
                    <p>Adres:</p><p>Typ ogłoszeniodawcy:</p><p>biuro</p>";
        let details = extractor().extract(html);
        assert_eq!(details.floor, None);
        assert_eq!(details.address, None);
    }

    #[test]
    fn test_floor_ignores_values_on_other_lines() {
        let html = r#"<div class="table-value-item">
                <p>Liczba pokoi</p><p>3</p><p>Piętro</p><p>3/5</p>
            </div>"#;
        let details = extractor().extract(html);
        assert_eq!(details.rooms, Some(3));
        assert_eq!(details.floor, None);
    }

    #[test]
    fn test_floor_from_inline_text() {
        let details = extractor().extract("<p>Mieszkanie na 4 piętro, bez windy</p>");
        assert_eq!(details.floor.as_deref(), Some("4"));
    }

    #[test]
    fn test_fields_without_parameter_block() {
        let html = r##"<html><body>
            <h1 data-cy="adPageAdTitle">Mieszkanie 3 pokoje Ursynów</h1>
            <strong aria-label="Cena">799 000 zł</strong>
            <a aria-label="Adres" href="#map">ul. Dereniowa, Ursynów, Warszawa</a>
            <div><p>Powierzchnia:</p><p>61,2 m²</p></div>
            <div><p>Liczba pokoi:</p><p>3</p></div>
            <ul>
                <li data-cy="ad-details-equipment-item">balkon</li>
                <li data-cy="ad-details-equipment-item">garaż</li>
            </ul>
            <p>Winda:</p><p>tak</p>
            </body></html>"##;
        let details = extractor().extract(html);

        assert_eq!(details.title.as_deref(), Some("Mieszkanie 3 pokoje Ursynów"));
        assert_eq!(details.price, Some(799_000));
        assert_eq!(details.area, Some(61.2));
        assert_eq!(details.rooms, Some(3));
        assert_eq!(details.address.as_deref(), Some("ul. Dereniowa, Ursynów, Warszawa"));
        assert_eq!(details.features, Some(vec!["balkon".to_string(), "garaż".to_string()]));
        assert_eq!(details.elevator, None);
        assert_eq!(details.rent, None);
    }

    #[test]
    fn test_empty_page_yields_empty_details() {
        let details = extractor().extract("<html><body><p>Strona nie istnieje</p></body></html>");
        assert!(details.is_empty());
    }
}

use otodom_scraper::extract::FieldExtractor;
use otodom_scraper::models::Market;
use rstest::rstest;

fn block(lines: &str) -> String {
    format!("<div><p>Czynsz:</p><p>500 zł</p>{}<p>ID: 1</p></div>", lines)
}

#[rstest]
#[case("tak", Some(true))]
#[case("Tak", Some(true))]
#[case("nie", Some(false))]
#[case("brak informacji", None)]
fn test_elevator_values(#[case] value: &str, #[case] expected: Option<bool>) {
    let html = block(&format!("<p>Winda:</p><p>{}</p>", value));
    let details = FieldExtractor::new().unwrap().extract(&html);
    assert_eq!(details.elevator, expected);
}

#[rstest]
#[case("<p>1 250 000 zł</p>", Some(1_250_000))]
#[case("<p>PLN 899000</p>", Some(899_000))]
#[case(r#"<script>{"price": "540000"}</script>"#, Some(540_000))]
#[case("<p>Zapytaj o cenę</p>", None)]
fn test_price_sources(#[case] fragment: &str, #[case] expected: Option<i64>) {
    let details = FieldExtractor::new().unwrap().extract(fragment);
    assert_eq!(details.price, expected);
}

#[rstest]
#[case("pierwotny", Some(Market::Primary))]
#[case("wtórny", Some(Market::Secondary))]
#[case("inny", None)]
fn test_market_values(#[case] value: &str, #[case] expected: Option<Market>) {
    let html = block(&format!("<p>Rynek:</p><p>{}</p>", value));
    let details = FieldExtractor::new().unwrap().extract(&html);
    assert_eq!(details.market, expected);
}

#[test]
fn test_block_fields_need_end_marker() {
    let html = "<p>Czynsz:</p><p>500 zł</p><p>Winda:</p><p>tak</p>";
    let details = FieldExtractor::new().unwrap().extract(html);

    assert_eq!(details.elevator, None);
    assert_eq!(details.rent, None);
}

//! Console statistics over a batch of scraped listings.

pub mod stats;

use std::fmt;

use crate::models::{ListingDetails, ListingRecord, Market};
use stats::{format_thousands, value_counts, Summary};

const RULE: &str = "============================================================";
const TOP_N: usize = 10;
const SAMPLE_COUNT: usize = 3;
const SAMPLE_TITLE_CHARS: usize = 60;

/// Which optional fields a record carries, in column order. Features count
/// only when the list is non-empty and descriptions only when non-blank.
fn field_presence(details: &ListingDetails) -> [(&'static str, bool); 17] {
    [
        ("title", details.title.is_some()),
        ("price", details.price.is_some()),
        ("area", details.area.is_some()),
        ("rooms", details.rooms.is_some()),
        ("floor", details.floor.is_some()),
        ("address", details.address.is_some()),
        ("market", details.market.is_some()),
        ("rent", details.rent.is_some()),
        ("finish_state", details.finish_state.is_some()),
        ("ownership", details.ownership.is_some()),
        ("advertiser_type", details.advertiser_type.is_some()),
        ("year_built", details.year_built.is_some()),
        ("elevator", details.elevator.is_some()),
        ("building_type", details.building_type.is_some()),
        ("building_material", details.building_material.is_some()),
        (
            "features",
            details.features.as_ref().is_some_and(|f| !f.is_empty()),
        ),
        (
            "description",
            details
                .description
                .as_ref()
                .is_some_and(|d| !d.trim().is_empty()),
        ),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletenessStatus {
    Ok,
    Warn,
    Missing,
}

impl CompletenessStatus {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage > 80.0 {
            CompletenessStatus::Ok
        } else if percentage > 50.0 {
            CompletenessStatus::Warn
        } else {
            CompletenessStatus::Missing
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompletenessStatus::Ok => "OK",
            CompletenessStatus::Warn => "WARN",
            CompletenessStatus::Missing => "BRAK",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldCompleteness {
    pub field: &'static str,
    pub present: usize,
    pub percentage: f64,
}

impl FieldCompleteness {
    pub fn status(&self) -> CompletenessStatus {
        CompletenessStatus::from_percentage(self.percentage)
    }
}

/// Everything the console report shows, computed up front.
#[derive(Debug, Clone)]
pub struct DatasetReport {
    pub source: Option<String>,
    pub total: usize,
    pub columns: Vec<&'static str>,
    pub completeness: Vec<FieldCompleteness>,
    pub price: Option<Summary>,
    pub area: Option<Summary>,
    pub price_per_m2: Option<Summary>,
    pub rooms: Vec<(i64, usize)>,
    pub floors: Vec<(String, usize)>,
    pub markets: Vec<(Market, usize)>,
    pub districts: Vec<(String, usize)>,
    pub samples: Vec<ListingRecord>,
}

impl DatasetReport {
    pub fn from_records(records: &[ListingRecord]) -> Self {
        let total = records.len();
        let details: Vec<&ListingDetails> = records.iter().map(|r| &r.details).collect();

        // A column exists once any record has the field at all, even if empty.
        let mut columns = vec!["url", "scraped_at"];
        let mut completeness = Vec::new();
        let presence: Vec<_> = details.iter().map(|d| field_presence(d)).collect();
        for (i, (field, _)) in field_presence(&ListingDetails::default()).into_iter().enumerate() {
            let has_column = details.iter().any(|d| has_value(d, field));
            if !has_column {
                continue;
            }
            let present = presence.iter().filter(|p| p[i].1).count();
            columns.push(field);
            completeness.push(FieldCompleteness {
                field,
                present,
                percentage: percentage(present, total),
            });
        }
        if total == 0 {
            columns.clear();
        }

        let prices: Vec<f64> = details.iter().filter_map(|d| d.price).map(|p| p as f64).collect();
        let areas: Vec<f64> = details.iter().filter_map(|d| d.area).collect();
        let per_m2: Vec<f64> = details.iter().filter_map(|d| d.price_per_m2()).collect();

        let mut rooms = value_counts(details.iter().filter_map(|d| d.rooms));
        rooms.sort_by_key(|(rooms, _)| *rooms);

        let mut floors = value_counts(details.iter().filter_map(|d| d.floor.clone()));
        floors.truncate(TOP_N);

        let markets = value_counts(details.iter().filter_map(|d| d.market));

        let mut districts = value_counts(details.iter().filter_map(|d| d.district()));
        districts.truncate(TOP_N);

        let samples = records
            .iter()
            .filter(|r| {
                let d = &r.details;
                d.price.is_some() && d.area.is_some() && d.rooms.is_some() && d.address.is_some()
            })
            .take(SAMPLE_COUNT)
            .cloned()
            .collect();

        Self {
            source: None,
            total,
            columns,
            completeness,
            price: Summary::from_values(&prices),
            area: Summary::from_values(&areas),
            price_per_m2: Summary::from_values(&per_m2),
            rooms,
            floors,
            markets,
            districts,
            samples,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn percentage_of_total(&self, count: usize) -> f64 {
        percentage(count, self.total)
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

// Column presence, as opposed to a usable value: an empty features list or
// blank description still creates the column.
fn has_value(details: &ListingDetails, field: &str) -> bool {
    match field {
        "features" => details.features.is_some(),
        "description" => details.description.is_some(),
        _ => field_presence(details)
            .iter()
            .any(|(name, present)| *name == field && *present),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

impl fmt::Display for DatasetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{}", RULE)?;
        match &self.source {
            Some(source) => writeln!(f, "ANALIZA DANYCH Z PLIKU: {}", source)?,
            None => writeln!(f, "ANALIZA DANYCH")?,
        }
        writeln!(f, "{}\n", RULE)?;

        writeln!(f, "Podstawowe informacje:")?;
        writeln!(f, "   - Liczba ofert: {}", self.total)?;
        writeln!(f, "   - Liczba kolumn: {}", self.columns.len())?;
        writeln!(f, "   - Kolumny: {}\n", self.columns.join(", "))?;

        writeln!(f, "Kompletność danych:")?;
        for field in &self.completeness {
            writeln!(
                f,
                "   [{}] {}: {}/{} ({:.1}%)",
                field.status().label(),
                field.field,
                field.present,
                self.total,
                field.percentage
            )?;
        }

        if let Some(price) = &self.price {
            writeln!(f, "\nStatystyki cenowe:")?;
            writeln!(f, "   - Średnia cena: {} zł", format_thousands(price.mean))?;
            writeln!(f, "   - Mediana ceny: {} zł", format_thousands(price.median))?;
            writeln!(f, "   - Cena minimalna: {} zł", format_thousands(price.min))?;
            writeln!(f, "   - Cena maksymalna: {} zł", format_thousands(price.max))?;
            match price.std_dev {
                Some(std_dev) => {
                    writeln!(f, "   - Odchylenie standardowe: {} zł", format_thousands(std_dev))?
                }
                None => writeln!(f, "   - Odchylenie standardowe: -")?,
            }
        }

        if let Some(area) = &self.area {
            writeln!(f, "\nStatystyki powierzchni:")?;
            writeln!(f, "   - Średnia powierzchnia: {:.1} m²", area.mean)?;
            writeln!(f, "   - Mediana powierzchni: {:.1} m²", area.median)?;
            writeln!(f, "   - Min/Max: {:.1} - {:.1} m²", area.min, area.max)?;
        }

        if let Some(per_m2) = &self.price_per_m2 {
            writeln!(f, "\nCena za m²:")?;
            writeln!(f, "   - Średnia: {} zł/m²", format_thousands(per_m2.mean))?;
            writeln!(f, "   - Mediana: {} zł/m²", format_thousands(per_m2.median))?;
        }

        if !self.rooms.is_empty() {
            writeln!(f, "\nRozkład liczby pokoi:")?;
            for (rooms, count) in &self.rooms {
                writeln!(
                    f,
                    "   - {} pokoje: {} ofert ({:.1}%)",
                    rooms,
                    count,
                    self.percentage_of_total(*count)
                )?;
            }
        }

        if !self.floors.is_empty() {
            writeln!(f, "\nRozkład pięter:")?;
            for (floor, count) in &self.floors {
                writeln!(f, "   - {}: {} ofert", floor, count)?;
            }
        }

        if !self.markets.is_empty() {
            writeln!(f, "\nTyp rynku:")?;
            for (market, count) in &self.markets {
                writeln!(
                    f,
                    "   - {}: {} ofert ({:.1}%)",
                    market,
                    count,
                    self.percentage_of_total(*count)
                )?;
            }
        }

        if !self.districts.is_empty() {
            writeln!(f, "\nNajpopularniejsze lokalizacje:")?;
            for (district, count) in &self.districts {
                writeln!(f, "   - {}: {} ofert", district, count)?;
            }
        }

        writeln!(f, "\nPrzykładowe oferty z pełnymi danymi:")?;
        if self.samples.is_empty() {
            writeln!(f, "   Brak ofert z kompletnymi danymi")?;
        }
        for (i, record) in self.samples.iter().enumerate() {
            let d = &record.details;
            writeln!(f, "\n   Oferta {}:", i + 1)?;
            writeln!(
                f,
                "   - Tytuł: {}...",
                truncate_chars(d.title.as_deref().unwrap_or("Brak"), SAMPLE_TITLE_CHARS)
            )?;
            if let Some(price) = d.price {
                writeln!(f, "   - Cena: {} zł", format_thousands(price as f64))?;
            }
            if let Some(area) = d.area {
                writeln!(f, "   - Powierzchnia: {} m²", area)?;
            }
            if let Some(per_m2) = d.price_per_m2() {
                writeln!(f, "   - Cena/m²: {} zł/m²", format_thousands(per_m2))?;
            }
            if let Some(rooms) = d.rooms {
                writeln!(f, "   - Pokoje: {}", rooms)?;
            }
            if let Some(address) = &d.address {
                writeln!(f, "   - Lokalizacja: {}", address)?;
            }
            if let Some(floor) = &d.floor {
                writeln!(f, "   - Piętro: {}", floor)?;
            }
        }

        writeln!(f, "\n{}", RULE)
    }
}

/// Prints the full report for a batch to stdout.
pub fn print_report(records: &[ListingRecord]) {
    println!("{}", DatasetReport::from_records(records));
}

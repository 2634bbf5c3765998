use crate::extract::rules::{parse_integer, parse_value, parse_yes_no, FieldRule, Matcher};
use crate::models::{ListingDetails, Market};
use crate::utils::error::Result;

pub const BLOCK_START: &str = "Czynsz:";
pub const BLOCK_END_MARKERS: [&str; 2] = ["ID:", "Opis"];

/// Locates the parameter block: the text from `Czynsz:` up to the first end
/// marker after it. Both boundaries must be present.
pub fn locate_block(text: &str) -> Option<&str> {
    let start = text.find(BLOCK_START)?;
    let rest = &text[start..];
    let end = BLOCK_END_MARKERS
        .iter()
        .filter_map(|marker| rest[BLOCK_START.len()..].find(marker))
        .min()?;
    Some(&rest[..BLOCK_START.len() + end])
}

/// Label patterns mined from inside the parameter block.
pub struct ParameterRules {
    rent: FieldRule<i64>,
    finish_state: FieldRule<String>,
    ownership: FieldRule<String>,
    market: FieldRule<Market>,
    advertiser_type: FieldRule<String>,
    year_built: FieldRule<i64>,
    elevator: FieldRule<bool>,
    building_type: FieldRule<String>,
    building_material: FieldRule<String>,
}

fn labelled(name: &'static str, label: &str) -> Result<FieldRule<String>> {
    Ok(FieldRule::new(name, parse_value).with(Matcher::text(&format!(
        r"{}:[ \t]*\n?[ \t]*([^\n]+)",
        label
    ))?))
}

impl ParameterRules {
    pub fn new() -> Result<Self> {
        Ok(Self {
            rent: FieldRule::new("rent", parse_integer)
                .with(Matcher::text(r"Czynsz:\s*(\d[\d ]*)\s*zł")?),
            finish_state: labelled("finish_state", "Stan wykończenia")?,
            ownership: labelled("ownership", "Forma własności")?,
            market: FieldRule::new("market", Market::from_label)
                .with(Matcher::text(r"Rynek:\s*(\p{L}+)")?),
            advertiser_type: labelled("advertiser_type", "Typ ogłoszeniodawcy")?,
            year_built: FieldRule::new("year_built", parse_integer)
                .with(Matcher::text(r"Rok budowy:\s*(\d{4})")?),
            elevator: FieldRule::new("elevator", parse_yes_no)
                .with(Matcher::text(r"Winda:\s*(\p{L}+)")?),
            building_type: labelled("building_type", "Rodzaj zabudowy")?,
            building_material: labelled("building_material", "Materiał budynku")?,
        })
    }

    pub fn apply(&self, block: &str, details: &mut ListingDetails) {
        details.rent = self.rent.extract_text(block);
        details.finish_state = self.finish_state.extract_text(block);
        details.ownership = self.ownership.extract_text(block);
        details.market = self.market.extract_text(block);
        details.advertiser_type = self.advertiser_type.extract_text(block);
        details.year_built = self.year_built.extract_text(block);
        details.elevator = self.elevator.extract_text(block);
        details.building_type = self.building_type.extract_text(block);
        details.building_material = self.building_material.extract_text(block);
    }
}

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Property market type as labelled on the listing page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Market {
    #[serde(rename = "pierwotny")]
    Primary,
    #[serde(rename = "wtórny")]
    Secondary,
}

impl Market {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "pierwotny" => Some(Market::Primary),
            "wtórny" | "wtorny" => Some(Market::Secondary),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Market::Primary => "pierwotny",
            Market::Secondary => "wtórny",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the field extractor can find on one listing page.
///
/// Every field is independently optional; a page where nothing matches
/// yields `ListingDetails::default()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<Market>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertiser_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevator: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ListingDetails {
    pub fn is_empty(&self) -> bool {
        *self == ListingDetails::default()
    }

    /// Price divided by area, when both are known and the area is positive.
    pub fn price_per_m2(&self) -> Option<f64> {
        match (self.price, self.area) {
            (Some(price), Some(area)) if area > 0.0 => Some(price as f64 / area),
            _ => None,
        }
    }

    /// Second comma-separated segment of the address, e.g. the district in
    /// `"Warszawa, Mokotów, ul. Puławska"`.
    pub fn district(&self) -> Option<String> {
        let address = self.address.as_deref()?;
        address
            .split(',')
            .nth(1)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// One scraped listing: the extracted details stamped with where and when
/// they were captured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub url: String,
    pub scraped_at: DateTime<Local>,
    #[serde(flatten)]
    pub details: ListingDetails,
}

impl ListingRecord {
    pub fn new(url: impl Into<String>, details: ListingDetails) -> Self {
        Self::with_timestamp(url, Local::now(), details)
    }

    pub fn with_timestamp(
        url: impl Into<String>,
        scraped_at: DateTime<Local>,
        details: ListingDetails,
    ) -> Self {
        Self {
            url: url.into(),
            scraped_at,
            details,
        }
    }
}

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::models::{ListingDetails, ListingRecord, Market};
use crate::utils::error::{AppError, Result};

const FEATURE_SEPARATOR: &str = "; ";

/// Flat CSV shape of a [`ListingRecord`]; absent values become empty cells.
#[derive(Debug, Serialize, Deserialize)]
struct ListingRow {
    url: String,
    scraped_at: DateTime<Local>,
    title: Option<String>,
    price: Option<i64>,
    area: Option<f64>,
    rooms: Option<i64>,
    floor: Option<String>,
    address: Option<String>,
    market: Option<Market>,
    rent: Option<i64>,
    finish_state: Option<String>,
    ownership: Option<String>,
    advertiser_type: Option<String>,
    year_built: Option<i64>,
    elevator: Option<bool>,
    building_type: Option<String>,
    building_material: Option<String>,
    features: Option<String>,
    description: Option<String>,
}

impl From<&ListingRecord> for ListingRow {
    fn from(record: &ListingRecord) -> Self {
        let d = &record.details;
        Self {
            url: record.url.clone(),
            scraped_at: record.scraped_at,
            title: d.title.clone(),
            price: d.price,
            area: d.area,
            rooms: d.rooms,
            floor: d.floor.clone(),
            address: d.address.clone(),
            market: d.market,
            rent: d.rent,
            finish_state: d.finish_state.clone(),
            ownership: d.ownership.clone(),
            advertiser_type: d.advertiser_type.clone(),
            year_built: d.year_built,
            elevator: d.elevator,
            building_type: d.building_type.clone(),
            building_material: d.building_material.clone(),
            features: d
                .features
                .as_ref()
                .filter(|features| !features.is_empty())
                .map(|features| features.join(FEATURE_SEPARATOR)),
            description: d.description.clone(),
        }
    }
}

impl From<ListingRow> for ListingRecord {
    fn from(row: ListingRow) -> Self {
        let features = row
            .features
            .map(|joined| {
                joined
                    .split(';')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|features| !features.is_empty());

        let details = ListingDetails {
            title: row.title,
            price: row.price,
            area: row.area,
            rooms: row.rooms,
            floor: row.floor,
            address: row.address,
            market: row.market,
            rent: row.rent,
            finish_state: row.finish_state,
            ownership: row.ownership,
            advertiser_type: row.advertiser_type,
            year_built: row.year_built,
            elevator: row.elevator,
            building_type: row.building_type,
            building_material: row.building_material,
            features,
            description: row.description,
        };

        ListingRecord::with_timestamp(row.url, row.scraped_at, details)
    }
}

pub fn write_csv(records: &[ListingRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(ListingRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Pretty-printed JSON array; Polish characters are written as-is.
pub fn write_json(records: &[ListingRecord], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

/// Loads a previously saved `.json` or `.csv` file.
pub fn load_records(path: &Path) -> Result<Vec<ListingRecord>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => {
            let reader = BufReader::new(File::open(path)?);
            Ok(serde_json::from_reader(reader)?)
        }
        Some("csv") => {
            let mut reader = csv::Reader::from_path(path)?;
            reader
                .deserialize::<ListingRow>()
                .map(|row| row.map(ListingRecord::from).map_err(AppError::from))
                .collect()
        }
        _ => Err(AppError::Validation(format!(
            "Unsupported data file: {}",
            path.display()
        ))),
    }
}

/// Files written by one run.
#[derive(Debug, Clone)]
pub struct SavedRun {
    pub csv: PathBuf,
    pub json: PathBuf,
    pub latest: PathBuf,
}

pub struct OutputStore {
    raw_dir: PathBuf,
    processed_dir: PathBuf,
    prefix: String,
}

impl OutputStore {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            raw_dir: config.raw_dir.clone(),
            processed_dir: config.processed_dir.clone(),
            prefix: config.file_prefix.clone(),
        }
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.raw_dir)?;
        fs::create_dir_all(&self.processed_dir)?;
        Ok(())
    }

    /// Writes the timestamped CSV and JSON files and overwrites the "latest"
    /// CSV.
    pub fn save_run(&self, records: &[ListingRecord], timestamp: DateTime<Local>) -> Result<SavedRun> {
        self.ensure_dirs()?;

        let stem = format!("{}_listings_{}", self.prefix, timestamp.format("%Y%m%d_%H%M%S"));
        let saved = SavedRun {
            csv: self.raw_dir.join(format!("{}.csv", stem)),
            json: self.raw_dir.join(format!("{}.json", stem)),
            latest: self.raw_dir.join(format!("{}_latest.csv", self.prefix)),
        };

        write_csv(records, &saved.csv)?;
        info!(count = records.len(), path = %saved.csv.display(), "Saved listings CSV");

        write_json(records, &saved.json)?;
        info!(path = %saved.json.display(), "Saved listings JSON");

        write_csv(records, &saved.latest)?;
        debug!(path = %saved.latest.display(), "Updated latest CSV");

        Ok(saved)
    }

    /// Most recently modified `.json`/`.csv` data file in the raw directory
    /// whose name carries the file prefix.
    pub fn latest_data_file(&self) -> Result<Option<PathBuf>> {
        if !self.raw_dir.exists() {
            return Ok(None);
        }

        let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
        for entry in fs::read_dir(&self.raw_dir)? {
            let path = entry?.path();
            if !path.is_file() || !self.is_data_file(&path) {
                continue;
            }

            let modified = fs::metadata(&path)?.modified()?;
            if newest.as_ref().is_none_or(|(time, _)| modified > *time) {
                newest = Some((modified, path));
            }
        }

        Ok(newest.map(|(_, path)| path))
    }

    fn is_data_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        name.contains(&self.prefix) && (name.ends_with(".json") || name.ends_with(".csv"))
    }
}

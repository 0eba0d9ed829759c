//! CSV region loader.
//!
//! # CSV format
//!
//! One row per region.  Column order is free; headers are matched after
//! trimming, lower-casing, and replacing spaces with `_`.
//!
//! ```csv
//! Ward,Latitude,Longitude,Flood-risk_level
//! Andheri East,19.1136,72.8697,high
//! Bandra West,19.0596,72.8295,low
//! ```
//!
//! | Field  | Accepted headers                                                     |
//! |--------|----------------------------------------------------------------------|
//! | `name` | `name`, `areas`, `area`, `ward`, `region`                            |
//! | `lat`  | `lat`, `latitude`, `y`                                               |
//! | `lon`  | `lon`, `lng`, `longitude`, `x`                                       |
//! | `risk` | `risk`, `risk_level`, `flood_risk`, `flood_risk_level`, `flood-risk_level` |
//!
//! Empty cells become missing fields and are reported by
//! [`RegionIndex::load`] with their row number.

use std::io::Read;
use std::path::Path;

use crate::region::{RegionIndex, RegionRecord};
use crate::{RegionError, RegionResult};

const NAME_HEADERS: &[&str] = &["name", "areas", "area", "ward", "region"];
const LAT_HEADERS:  &[&str] = &["lat", "latitude", "y"];
const LON_HEADERS:  &[&str] = &["lon", "lng", "longitude", "x"];
const RISK_HEADERS: &[&str] = &[
    "risk",
    "risk_level",
    "flood_risk",
    "flood_risk_level",
    "flood-risk_level",
];

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`RegionIndex`] from a CSV file.
pub fn load_regions_csv(path: &Path) -> RegionResult<RegionIndex> {
    let file = std::fs::File::open(path)?;
    load_regions_reader(file)
}

/// Like [`load_regions_csv`] but accepts any `Read` source.
pub fn load_regions_reader<R: Read>(reader: R) -> RegionResult<RegionIndex> {
    RegionIndex::load(read_records(reader)?)
}

/// Parse raw region records without validating them.
pub fn read_records<R: Read>(reader: R) -> RegionResult<Vec<RegionRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| RegionError::Parse(e.to_string()))?
        .iter()
        .map(normalize_header)
        .collect();

    let name_col = column(&headers, NAME_HEADERS).ok_or(RegionError::MissingColumn("name"))?;
    let lat_col  = column(&headers, LAT_HEADERS).ok_or(RegionError::MissingColumn("lat"))?;
    let lon_col  = column(&headers, LON_HEADERS).ok_or(RegionError::MissingColumn("lon"))?;
    let risk_col = column(&headers, RISK_HEADERS).ok_or(RegionError::MissingColumn("risk"))?;

    let mut records = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let row = result.map_err(|e| RegionError::Parse(e.to_string()))?;
        let cell = |col: usize| row.get(col).filter(|s| !s.is_empty());

        records.push(RegionRecord {
            name: cell(name_col).map(str::to_string),
            lat:  cell(lat_col).map(|s| parse_coord(s, i + 1, "lat")).transpose()?,
            lon:  cell(lon_col).map(|s| parse_coord(s, i + 1, "lon")).transpose()?,
            risk: cell(risk_col).map(str::to_string),
        });
    }
    Ok(records)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace(' ', "_")
}

/// First column whose header is one of `aliases`, preferring alias order.
fn column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == alias))
}

fn parse_coord(s: &str, row: usize, field: &str) -> RegionResult<f64> {
    s.parse::<f64>().map_err(|_| {
        RegionError::Parse(format!("region record {row}: invalid {field} {s:?}"))
    })
}

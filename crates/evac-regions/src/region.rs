//! Labeled regions and the immutable `RegionIndex`.
//!
//! # Name normalization
//!
//! Region names are trimmed, lower-cased, and have internal whitespace runs
//! collapsed to one space.  Uniqueness is enforced on the normalized form, and
//! every lookup by name normalizes its argument the same way.
//!
//! # Queries
//!
//! Region counts are small (tens to low hundreds), so nearest-region is a
//! plain linear haversine scan with the lowest `RegionId` winning ties.

use std::collections::HashMap;

use evac_core::{GeoPoint, RegionId, RiskLevel};

use crate::resolver::normalize_query;
use crate::{RegionError, RegionResult};

// ── Input record ──────────────────────────────────────────────────────────────

/// One unvalidated region row as delivered by a data collaborator.
///
/// Fields are optional so that an incomplete row can be reported precisely
/// by [`RegionIndex::load`] instead of failing somewhere upstream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionRecord {
    pub name: Option<String>,
    pub lat:  Option<f64>,
    pub lon:  Option<f64>,
    pub risk: Option<String>,
}

impl RegionRecord {
    /// A complete record.
    pub fn new(name: impl Into<String>, lat: f64, lon: f64, risk: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            lat:  Some(lat),
            lon:  Some(lon),
            risk: Some(risk.into()),
        }
    }
}

// ── Region ────────────────────────────────────────────────────────────────────

/// A named area with a point location and a flood-risk label.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    /// Normalized name (see module docs).
    pub name: String,
    pub pos:  GeoPoint,
    pub risk: RiskLevel,
}

/// Canonical form of a region name or query.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ── RegionIndex ───────────────────────────────────────────────────────────────

/// Immutable, load-ordered collection of regions.
#[derive(Clone, Debug, Default)]
pub struct RegionIndex {
    regions: Vec<Region>,
    by_name: HashMap<String, RegionId>,
}

impl RegionIndex {
    /// Validate `records` and build the index.  `RegionId`s follow input
    /// order.
    ///
    /// # Errors
    ///
    /// Fails on the first record that lacks a name, coordinates, or risk
    /// label, carries an unrecognised risk label or out-of-range coordinates,
    /// or whose normalized name is already taken.
    pub fn load<I>(records: I) -> RegionResult<Self>
    where
        I: IntoIterator<Item = RegionRecord>,
    {
        let mut index = RegionIndex::default();

        for (i, rec) in records.into_iter().enumerate() {
            let row = i + 1;
            let name = rec
                .name
                .as_deref()
                .map(normalize_name)
                .filter(|n| !n.is_empty())
                .ok_or(RegionError::MissingField { row, field: "name" })?;
            let lat = rec.lat.ok_or(RegionError::MissingField { row, field: "lat" })?;
            let lon = rec.lon.ok_or(RegionError::MissingField { row, field: "lon" })?;
            let risk = match rec.risk.as_deref().map(str::trim) {
                None | Some("") => return Err(RegionError::MissingField { row, field: "risk" }),
                Some(raw) => raw
                    .parse::<RiskLevel>()
                    .map_err(|source| RegionError::InvalidRisk { row, source })?,
            };

            let pos = GeoPoint::new(lat, lon);
            if !pos.is_valid() {
                return Err(RegionError::InvalidCoordinate { row, name });
            }

            if let Some(&first) = index.by_name.get(&name) {
                return Err(RegionError::DuplicateName { row, name, first });
            }

            let id = RegionId(index.regions.len() as u32);
            index.by_name.insert(name.clone(), id);
            index.regions.push(Region { name, pos, risk });
        }

        tracing::info!(
            regions = index.len(),
            safe_zones = index.count_by_risk(RiskLevel::Low),
            "region index loaded"
        );
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    /// Look up a region by name; the argument is normalized first.
    pub fn find(&self, name: &str) -> Option<RegionId> {
        self.by_name.get(&normalize_name(name)).copied()
    }

    /// All regions with their ids, in load order.
    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Region)> + '_ {
        self.regions
            .iter()
            .enumerate()
            .map(|(i, r)| (RegionId(i as u32), r))
    }

    /// Normalized region names in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.regions.iter().map(|r| r.name.as_str())
    }

    /// Nearest region to `pos` by haversine distance; lowest `RegionId` wins
    /// ties.  `None` only when the index is empty.
    pub fn nearest_region(&self, pos: GeoPoint) -> Option<RegionId> {
        self.iter()
            .map(|(id, r)| (pos.distance_m(r.pos), id))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| id)
    }

    /// Regions labeled exactly `level`, in load order.
    pub fn regions_by_risk(&self, level: RiskLevel) -> impl Iterator<Item = (RegionId, &Region)> + '_ {
        self.iter().filter(move |(_, r)| r.risk == level)
    }

    pub fn count_by_risk(&self, level: RiskLevel) -> usize {
        self.regions_by_risk(level).count()
    }

    /// Up to `limit` region names containing `fragment` (case-insensitive), in
    /// load order.  Fragments shorter than two characters suggest nothing.
    pub fn suggest(&self, fragment: &str, limit: usize) -> Vec<&str> {
        let needle = normalize_query(fragment);
        if needle.chars().count() < 2 {
            return Vec::new();
        }
        self.names()
            .filter(|n| n.contains(&needle))
            .take(limit)
            .collect()
    }
}

impl std::ops::Index<RegionId> for RegionIndex {
    type Output = Region;

    fn index(&self, id: RegionId) -> &Region {
        &self.regions[id.index()]
    }
}

//! CSV road-network loader.
//!
//! # CSV format
//!
//! Two files: one row per node, one row per road segment.
//!
//! ```csv
//! id,lat,lon
//! 1001,19.0544,72.8402
//! 1002,19.0601,72.8363
//! ```
//!
//! ```csv
//! from,to,length_m,oneway
//! 1001,1002,752.4,false
//! 1002,1001,610.0,true
//! ```
//!
//! Accepted header aliases: `osmid`/`node` for `id`, `y`/`latitude` for
//! `lat`, `x`/`lng`/`longitude` for `lon`, `u`/`source` for `from`,
//! `v`/`target` for `to`, `length`/`length_meters` for `length_m`.
//!
//! **`oneway`** is optional.  Absent, empty, or false-y values add the
//! segment in both directions; `true`/`yes`/`1` adds only `from → to`.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use evac_core::{GeoPoint, NodeId};

use crate::network::{RoadNetwork, RoadNetworkBuilder};
use crate::{SpatialError, SpatialResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    #[serde(alias = "osmid", alias = "node")]
    id:  i64,
    #[serde(alias = "y", alias = "latitude")]
    lat: f64,
    #[serde(alias = "x", alias = "lng", alias = "longitude")]
    lon: f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    #[serde(alias = "u", alias = "source")]
    from:     i64,
    #[serde(alias = "v", alias = "target")]
    to:       i64,
    #[serde(alias = "length", alias = "length_meters")]
    length_m: f64,
    #[serde(default)]
    oneway:   Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a road network from a node CSV and an edge CSV.
pub fn load_network_csv(nodes: &Path, edges: &Path) -> SpatialResult<RoadNetwork> {
    let nodes = std::fs::File::open(nodes)?;
    let edges = std::fs::File::open(edges)?;
    load_network_reader(nodes, edges)
}

/// Like [`load_network_csv`] but accepts any `Read` sources.
///
/// Useful for testing (pass a `std::io::Cursor`) or loading from network
/// streams.
pub fn load_network_reader<N: Read, E: Read>(nodes: N, edges: E) -> SpatialResult<RoadNetwork> {
    let mut builder = RoadNetworkBuilder::new();
    let mut by_source: HashMap<i64, NodeId> = HashMap::new();

    // ── Nodes ─────────────────────────────────────────────────────────────
    let mut node_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(nodes);
    for result in node_reader.deserialize::<NodeRecord>() {
        let row = result.map_err(|e| SpatialError::Parse(e.to_string()))?;
        if by_source.contains_key(&row.id) {
            return Err(SpatialError::DuplicateSourceNode(row.id));
        }
        let id = builder.add_source_node(row.id, GeoPoint::new(row.lat, row.lon));
        by_source.insert(row.id, id);
    }

    // ── Edges ─────────────────────────────────────────────────────────────
    let mut edge_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(edges);
    for result in edge_reader.deserialize::<EdgeRecord>() {
        let row = result.map_err(|e| SpatialError::Parse(e.to_string()))?;
        let from = *by_source
            .get(&row.from)
            .ok_or(SpatialError::UnknownSourceNode(row.from))?;
        let to = *by_source
            .get(&row.to)
            .ok_or(SpatialError::UnknownSourceNode(row.to))?;

        if parse_oneway(row.oneway.as_deref())? {
            builder.add_directed_edge(from, to, row.length_m);
        } else {
            builder.add_road(from, to, row.length_m);
        }
    }

    builder.build()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_oneway(s: Option<&str>) -> SpatialResult<bool> {
    match s.map(|v| v.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("no") | Some("0") => Ok(false),
        Some("true") | Some("yes") | Some("1") => Ok(true),
        Some(other) => Err(SpatialError::Parse(format!(
            "invalid oneway {other:?}: expected true/false, yes/no, or 1/0"
        ))),
    }
}

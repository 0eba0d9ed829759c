//! Built-in synthetic city.
//!
//! Eight wards and three junctions loosely following the geography of
//! Mumbai.  Used when no CSV dataset is given on the command line.

use std::io::Cursor;

use evac_core::GeoPoint;
use evac_regions::{RegionIndex, RegionResult, load_regions_reader};
use evac_spatial::{RoadNetwork, RoadNetworkBuilder, SpatialResult};

// Headers use the aliases found in exported flood-risk sheets.
const WARDS_CSV: &str = "\
Ward,Latitude,Longitude,Flood-risk_level\n\
Colaba,18.9067,72.8147,moderate\n\
Dadar,19.0178,72.8478,high\n\
Bandra West,19.0596,72.8295,low\n\
Kurla,19.0726,72.8845,high\n\
Andheri East,19.1136,72.8697,high\n\
Powai,19.1176,72.9060,low\n\
Borivali,19.2307,72.8567,low\n\
Chembur,19.0522,72.9005,moderate\n\
";

pub fn build_regions() -> RegionResult<RegionIndex> {
    load_regions_reader(Cursor::new(WARDS_CSV))
}

/// Build the 11-node road network.  Source ids are 1001.. in ward order,
/// then 2001.. for junctions.
pub fn build_network() -> SpatialResult<RoadNetwork> {
    let mut b = RoadNetworkBuilder::new();

    let colaba   = b.add_source_node(1001, GeoPoint::new(18.9067, 72.8147));
    let dadar    = b.add_source_node(1002, GeoPoint::new(19.0178, 72.8478));
    let bandra   = b.add_source_node(1003, GeoPoint::new(19.0596, 72.8295));
    let kurla    = b.add_source_node(1004, GeoPoint::new(19.0726, 72.8845));
    let andheri  = b.add_source_node(1005, GeoPoint::new(19.1136, 72.8697));
    let powai    = b.add_source_node(1006, GeoPoint::new(19.1176, 72.9060));
    let borivali = b.add_source_node(1007, GeoPoint::new(19.2307, 72.8567));
    let chembur  = b.add_source_node(1008, GeoPoint::new(19.0522, 72.9005));

    let sion       = b.add_source_node(2001, GeoPoint::new(19.0390, 72.8619));
    let vile_parle = b.add_source_node(2002, GeoPoint::new(19.0990, 72.8450));
    let jvlr       = b.add_source_node(2003, GeoPoint::new(19.1300, 72.8900));

    b.add_road(colaba,     dadar,      12_500.0);
    b.add_road(dadar,      sion,        3_000.0);
    b.add_road(dadar,      bandra,      5_500.0);
    b.add_road(dadar,      bandra,      4_800.0); // sea link
    b.add_road(sion,       kurla,       4_500.0);
    b.add_road(sion,       chembur,     4_500.0);
    b.add_road(bandra,     vile_parle,  5_000.0);
    b.add_road(kurla,      andheri,     6_000.0);
    b.add_road(vile_parle, andheri,     3_000.0);
    b.add_road(andheri,    jvlr,        2_500.0);
    b.add_road(jvlr,       powai,       2_000.0);
    b.add_road(kurla,      powai,       7_000.0);
    b.add_road(andheri,    borivali,   13_000.0);
    b.add_directed_edge(chembur, powai, 9_000.0); // eastern freeway, northbound only

    b.build()
}

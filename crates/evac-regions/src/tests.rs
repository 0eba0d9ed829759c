//! Unit tests for evac-regions.

use evac_core::{GeoPoint, RegionId, RiskLevel};

use crate::{RegionIndex, RegionRecord};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn rec(name: &str, lat: f64, lon: f64, risk: &str) -> RegionRecord {
    RegionRecord::new(name, lat, lon, risk)
}

/// Four wards along a north–south line, roughly 5.5 km apart.
fn wards() -> RegionIndex {
    RegionIndex::load(vec![
        rec("Borivali", 19.23, 72.85, "low"),
        rec("Andheri East", 19.18, 72.85, "high"),
        rec("Bandra West", 19.13, 72.85, "low"),
        rec("Colaba", 19.08, 72.85, "moderate"),
    ])
    .unwrap()
}

// ── RegionIndex::load ─────────────────────────────────────────────────────────

#[cfg(test)]
mod load {
    use super::*;
    use crate::RegionError;

    #[test]
    fn names_are_normalized() {
        let idx = RegionIndex::load(vec![rec("  Andheri   EAST ", 19.1, 72.8, "High")]).unwrap();
        assert_eq!(idx[RegionId(0)].name, "andheri east");
        assert_eq!(idx[RegionId(0)].risk, RiskLevel::High);
        assert_eq!(idx.find("ANDHERI east"), Some(RegionId(0)));
    }

    #[test]
    fn ids_follow_input_order() {
        let idx = wards();
        let names: Vec<&str> = idx.names().collect();
        assert_eq!(names, vec!["borivali", "andheri east", "bandra west", "colaba"]);
        assert_eq!(idx.find("colaba"), Some(RegionId(3)));
        assert_eq!(idx.len(), 4);
    }

    #[test]
    fn duplicate_after_normalization_rejected() {
        let err = RegionIndex::load(vec![
            rec("Dadar", 19.01, 72.84, "moderate"),
            rec(" dadar ", 19.02, 72.84, "low"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            RegionError::DuplicateName { row: 2, ref name, first: RegionId(0) } if name == "dadar"
        ));
    }

    #[test]
    fn missing_fields_rejected() {
        let no_name = RegionRecord { name: Some("   ".into()), ..rec("x", 1.0, 1.0, "low") };
        assert!(matches!(
            RegionIndex::load(vec![no_name]),
            Err(RegionError::MissingField { row: 1, field: "name" })
        ));

        let no_lat = RegionRecord { lat: None, ..rec("x", 1.0, 1.0, "low") };
        assert!(matches!(
            RegionIndex::load(vec![rec("ok", 1.0, 1.0, "low"), no_lat]),
            Err(RegionError::MissingField { row: 2, field: "lat" })
        ));

        let no_risk = RegionRecord { risk: Some(" ".into()), ..rec("x", 1.0, 1.0, "low") };
        assert!(matches!(
            RegionIndex::load(vec![no_risk]),
            Err(RegionError::MissingField { field: "risk", .. })
        ));
    }

    #[test]
    fn unknown_label_rejected_but_unknown_accepted() {
        assert!(matches!(
            RegionIndex::load(vec![rec("x", 1.0, 1.0, "extreme")]),
            Err(RegionError::InvalidRisk { row: 1, .. })
        ));
        let idx = RegionIndex::load(vec![rec("x", 1.0, 1.0, "unknown")]).unwrap();
        assert_eq!(idx[RegionId(0)].risk, RiskLevel::Unknown);
    }

    #[test]
    fn out_of_range_coordinates_rejected() {
        assert!(matches!(
            RegionIndex::load(vec![rec("x", 95.0, 1.0, "low")]),
            Err(RegionError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn empty_input_is_an_empty_index() {
        let idx = RegionIndex::load(Vec::new()).unwrap();
        assert!(idx.is_empty());
        assert!(idx.nearest_region(GeoPoint::new(0.0, 0.0)).is_none());
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod queries {
    use super::*;

    #[test]
    fn nearest_region_by_haversine() {
        let idx = wards();
        assert_eq!(idx.nearest_region(GeoPoint::new(19.17, 72.86)), Some(RegionId(1)));
        assert_eq!(idx.nearest_region(GeoPoint::new(19.00, 72.85)), Some(RegionId(3)));
    }

    #[test]
    fn nearest_region_tie_picks_lowest_id() {
        let idx = RegionIndex::load(vec![
            rec("north", 1.0, 0.0, "low"),
            rec("south", -1.0, 0.0, "high"),
        ])
        .unwrap();
        assert_eq!(idx.nearest_region(GeoPoint::new(0.0, 0.0)), Some(RegionId(0)));
    }

    #[test]
    fn regions_by_risk_in_load_order() {
        let idx = wards();
        let low: Vec<RegionId> = idx.regions_by_risk(RiskLevel::Low).map(|(id, _)| id).collect();
        assert_eq!(low, vec![RegionId(0), RegionId(2)]);
        assert_eq!(idx.count_by_risk(RiskLevel::High), 1);
        assert_eq!(idx.count_by_risk(RiskLevel::Unknown), 0);
    }

    #[test]
    fn suggestions() {
        let idx = wards();
        assert_eq!(idx.suggest("AN", 10), vec!["andheri east", "bandra west"]);
        assert_eq!(idx.suggest("an", 1), vec!["andheri east"]);
        assert!(idx.suggest("a", 10).is_empty());
        assert!(idx.suggest("worli", 10).is_empty());
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use super::*;
    use crate::{load_regions_reader, read_records, RegionError};

    #[test]
    fn header_aliases_are_normalized() {
        let csv = "\
Ward, Latitude ,Longitude,Flood-risk_level
Andheri East,19.1136,72.8697,HIGH
Bandra West,19.0596,72.8295,low
";
        let idx = load_regions_reader(Cursor::new(csv)).unwrap();
        assert_eq!(idx.len(), 2);
        assert_eq!(idx[RegionId(1)].name, "bandra west");
        assert_eq!(idx[RegionId(1)].risk, RiskLevel::Low);
        assert_eq!(idx[RegionId(0)].pos, GeoPoint::new(19.1136, 72.8697));
    }

    #[test]
    fn column_order_is_free() {
        let csv = "risk,lon,name,lat\nlow,72.8,Powai,19.1\n";
        let idx = load_regions_reader(Cursor::new(csv)).unwrap();
        assert_eq!(idx.find("powai"), Some(RegionId(0)));
        assert_eq!(idx[RegionId(0)].pos, GeoPoint::new(19.1, 72.8));
    }

    #[test]
    fn missing_column_rejected() {
        let csv = "name,lat,lon\nPowai,19.1,72.8\n";
        assert!(matches!(
            load_regions_reader(Cursor::new(csv)),
            Err(RegionError::MissingColumn("risk"))
        ));
    }

    #[test]
    fn empty_cell_is_missing_field() {
        let csv = "name,lat,lon,risk\nPowai,,72.8,low\n";
        let records = read_records(Cursor::new(csv)).unwrap();
        assert_eq!(records[0].lat, None);
        assert!(matches!(
            load_regions_reader(Cursor::new(csv)),
            Err(RegionError::MissingField { row: 1, field: "lat" })
        ));
    }

    #[test]
    fn bad_number_is_parse_error() {
        let csv = "name,lat,lon,risk\nPowai,north,72.8,low\n";
        assert!(matches!(load_regions_reader(Cursor::new(csv)), Err(RegionError::Parse(_))));
    }
}

// ── Fuzzy resolver ────────────────────────────────────────────────────────────

#[cfg(test)]
mod resolver {
    use crate::{FuzzyResolver, IndelRatio, Similarity, DEFAULT_MATCH_THRESHOLD, MAX_QUERY_CHARS};

    const CANDIDATES: [&str; 2] = ["andheri east", "bandra west"];

    #[test]
    fn typo_resolves_to_closest() {
        let m = FuzzyResolver::new()
            .resolve("andheri eest", CANDIDATES, DEFAULT_MATCH_THRESHOLD)
            .unwrap();
        assert_eq!(m.matched_name, "andheri east");
        assert_eq!(m.candidate_index, 0);
        assert!(m.score >= 80, "score {}", m.score);
    }

    #[test]
    fn exact_case_insensitive_scores_100() {
        let m = FuzzyResolver::new().best_match("  Bandra WEST ", CANDIDATES).unwrap();
        assert_eq!(m.matched_name, "bandra west");
        assert_eq!(m.score, 100);
    }

    #[test]
    fn indel_ratio_values() {
        assert_eq!(IndelRatio.score("andheri eest", "andheri east"), 92);
        assert_eq!(IndelRatio.score("abxy", "abcd"), 50);
        assert_eq!(IndelRatio.score("kurla", "kurla"), 100);
        assert_eq!(IndelRatio.score("abc", "xyz"), 0);
        assert_eq!(IndelRatio.score("", ""), 100);
    }

    #[test]
    fn overlong_query_is_cut() {
        let long = "b".repeat(20_000);
        let cut = "b".repeat(MAX_QUERY_CHARS);
        let r = FuzzyResolver::new();
        assert_eq!(r.score(&long, &cut), Some(100));
        let m = r.best_match(&long, [cut.as_str(), "bandra west"]).unwrap();
        assert_eq!(m.candidate_index, 0);
        assert_eq!(m.score, 100);
    }

    #[test]
    fn containment_scores_at_least_90() {
        let r = FuzzyResolver::new();
        assert!(r.score("andheri", "andheri east").unwrap() >= 90);
        assert!(r.score("bandra west station", "bandra west").unwrap() >= 90);
        // Non-equal strings never reach 100.
        assert!(r.score("andheri", "andheri east").unwrap() < 100);
    }

    #[test]
    fn empty_query_never_matches() {
        let r = FuzzyResolver::new();
        assert!(r.best_match("   ", CANDIDATES).is_none());
        let err = r.resolve("", CANDIDATES, 0).unwrap_err();
        assert!(err.best.is_none());
        assert_eq!(err.best_score(), 0);
    }

    #[test]
    fn empty_candidates_never_match() {
        let none: [&str; 0] = [];
        assert!(FuzzyResolver::new().resolve("colaba", none, 0).is_err());
    }

    #[test]
    fn threshold_boundary() {
        // LCS("abxy", "abcd") = 2 → 100 · 4 / 8 = 50.
        let r = FuzzyResolver::new();
        assert_eq!(r.score("abxy", "abcd"), Some(50));
        assert!(r.resolve("abxy", ["abcd"], 50).is_ok());
        let err = r.resolve("abxy", ["abcd"], 51).unwrap_err();
        assert_eq!(err.best_score(), 50);
        assert_eq!(err.best.unwrap().matched_name, "abcd");
    }

    #[test]
    fn equal_scores_keep_earliest_candidate() {
        let m = FuzzyResolver::new().best_match("dadar", ["dadar east", "dadar west"]).unwrap();
        assert_eq!(m.candidate_index, 0);
    }

    #[test]
    fn deterministic_across_calls() {
        let r = FuzzyResolver::new();
        let first = r.best_match("bndra", CANDIDATES);
        for _ in 0..10 {
            assert_eq!(r.best_match("bndra", CANDIDATES), first);
        }
    }

    #[test]
    fn indel_ratio_bounds() {
        assert_eq!(IndelRatio.score("", ""), 100);
        assert_eq!(IndelRatio.score("abc", ""), 0);
        assert_eq!(IndelRatio.score("abc", "xyz"), 0);
        assert_eq!(IndelRatio.score("abc", "abc"), 100);
    }

    /// A metric that rates everything equally still honours the contract.
    struct Flat;
    impl Similarity for Flat {
        fn score(&self, _: &str, _: &str) -> u8 {
            10
        }
    }

    #[test]
    fn contract_holds_for_any_metric() {
        let r = FuzzyResolver::with_similarity(Flat);
        assert_eq!(r.score("Colaba", "colaba"), Some(100));
        assert_eq!(r.score("cola", "colaba"), Some(90));
        assert_eq!(r.score("worli", "colaba"), Some(10));
    }
}

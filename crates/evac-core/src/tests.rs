//! Unit tests for evac-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId, RegionId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(RegionId(0) < RegionId(1));
        assert!(NodeId(100) > NodeId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
        assert_eq!(RegionId::INVALID.0, u32::MAX);
        assert_eq!(RegionId::default(), RegionId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::GeoPoint;

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(19.076, 72.877);
        assert!(p.distance_m(p) < 1e-6);
    }

    #[test]
    fn one_degree_latitude() {
        // ~1 degree of latitude ≈ 111 km
        let a = GeoPoint::new(19.0, 72.8);
        let b = GeoPoint::new(20.0, 72.8);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(19.119, 72.846);
        let b = GeoPoint::new(19.054, 72.840);
        assert!((a.distance_m(b) - b.distance_m(a)).abs() < 1e-9);
    }

    #[test]
    fn unit_vector_has_unit_length() {
        let v = GeoPoint::new(19.076, 72.877).unit_vector();
        let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-12);
    }

    #[test]
    fn chord_order_matches_haversine_order() {
        let origin = GeoPoint::new(19.0, 72.8);
        let near = GeoPoint::new(19.01, 72.81);
        let far = GeoPoint::new(19.2, 72.9);
        let chord = |p: GeoPoint| {
            let (a, b) = (origin.unit_vector(), p.unit_vector());
            (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
        };
        assert!(origin.distance_m(near) < origin.distance_m(far));
        assert!(chord(near) < chord(far));
    }

    #[test]
    fn validity() {
        assert!(GeoPoint::new(19.0, 72.8).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
    }
}

#[cfg(test)]
mod risk {
    use crate::{CoreError, RiskLevel};

    #[test]
    fn parse_is_case_and_whitespace_insensitive() {
        assert_eq!(" Low ".parse::<RiskLevel>().unwrap(), RiskLevel::Low);
        assert_eq!("MODERATE".parse::<RiskLevel>().unwrap(), RiskLevel::Moderate);
        assert_eq!("high".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert_eq!("unknown".parse::<RiskLevel>().unwrap(), RiskLevel::Unknown);
    }

    #[test]
    fn parse_rejects_unlisted_labels() {
        let err = "severe".parse::<RiskLevel>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidRiskLevel(ref s) if s == "severe"));
    }

    #[test]
    fn only_low_is_safe() {
        let safe: Vec<_> = RiskLevel::ALL.iter().filter(|r| r.is_safe()).collect();
        assert_eq!(safe, vec![&RiskLevel::Low]);
    }

    #[test]
    fn display_matches_as_str() {
        for r in RiskLevel::ALL {
            assert_eq!(r.to_string(), r.as_str());
            assert_eq!(r.as_str().parse::<RiskLevel>().unwrap(), r);
        }
    }
}

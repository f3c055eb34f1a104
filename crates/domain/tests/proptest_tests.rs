//! Property-based tests for domain value objects and the congestion segmenter
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::congestion::{CongestionLevel, dominant_congestion, segment};
use domain::value_objects::{BoundingBox, Coordinate};
use proptest::prelude::*;

fn coordinate_strategy() -> impl Strategy<Value = Coordinate> {
    (-180.0f64..=180.0f64, -90.0f64..=90.0f64)
        .prop_map(|(lon, lat)| Coordinate::new(lon, lat).unwrap())
}

fn level_strategy() -> impl Strategy<Value = CongestionLevel> {
    prop_oneof![
        Just(CongestionLevel::Low),
        Just(CongestionLevel::Moderate),
        Just(CongestionLevel::Heavy),
        Just(CongestionLevel::Severe),
        Just(CongestionLevel::Unknown),
    ]
}

/// A polyline of at least two points and one level per segment
fn annotated_route() -> impl Strategy<Value = (Vec<Coordinate>, Vec<CongestionLevel>)> {
    prop::collection::vec(coordinate_strategy(), 2..40).prop_flat_map(|coords| {
        let n = coords.len() - 1;
        (Just(coords), prop::collection::vec(level_strategy(), n))
    })
}

// ============================================================================
// Coordinate Property Tests
// ============================================================================

mod coordinate_tests {
    use super::*;

    proptest! {
        #[test]
        fn valid_values_create_coordinate(
            lon in -180.0f64..=180.0f64,
            lat in -90.0f64..=90.0f64
        ) {
            let c = Coordinate::new(lon, lat);
            prop_assert!(c.is_ok());
            let c = c.unwrap();
            prop_assert!((c.longitude() - lon).abs() < f64::EPSILON);
            prop_assert!((c.latitude() - lat).abs() < f64::EPSILON);
        }

        #[test]
        fn invalid_longitude_rejected(
            lon in prop_oneof![(-1000.0f64..-180.1f64), (180.1f64..1000.0f64)],
            lat in -90.0f64..=90.0f64
        ) {
            prop_assert!(Coordinate::new(lon, lat).is_err());
        }

        #[test]
        fn invalid_latitude_rejected(
            lon in -180.0f64..=180.0f64,
            lat in prop_oneof![(-1000.0f64..-90.1f64), (90.1f64..1000.0f64)]
        ) {
            prop_assert!(Coordinate::new(lon, lat).is_err());
        }

        #[test]
        fn bounding_box_contains_every_point(
            points in prop::collection::vec(coordinate_strategy(), 1..30)
        ) {
            let bbox = BoundingBox::enclosing(&points).unwrap();
            prop_assert!(points.iter().all(|p| bbox.contains(p)));
        }
    }
}

// ============================================================================
// Segmenter Property Tests
// ============================================================================

mod segmenter_tests {
    use super::*;

    proptest! {
        #[test]
        fn one_segment_per_consecutive_pair((coords, levels) in annotated_route()) {
            let segments = segment(&coords, &levels);
            prop_assert_eq!(segments.len(), coords.len() - 1);

            for (i, s) in segments.iter().enumerate() {
                prop_assert_eq!(s.coordinate_pair, [coords[i], coords[i + 1]]);
                prop_assert_eq!(s.level, levels[i]);
            }
        }

        #[test]
        fn segments_reproduce_geometry((coords, levels) in annotated_route()) {
            let segments = segment(&coords, &levels);
            let mut rebuilt = vec![segments[0].coordinate_pair[0]];
            rebuilt.extend(segments.iter().map(|s| s.coordinate_pair[1]));
            prop_assert_eq!(rebuilt, coords);
        }

        #[test]
        fn no_traffic_data_means_all_unknown(
            coords in prop::collection::vec(coordinate_strategy(), 2..40)
        ) {
            let segments = segment(&coords, &[]);
            prop_assert_eq!(segments.len(), coords.len() - 1);
            prop_assert!(segments.iter().all(|s| s.level == CongestionLevel::Unknown));
        }

        #[test]
        fn dominant_level_has_maximal_count((coords, levels) in annotated_route()) {
            let segments = segment(&coords, &levels);
            let dominant = dominant_congestion(&segments);
            let count = |l: CongestionLevel| segments.iter().filter(|s| s.level == l).count();

            for level in CongestionLevel::ALL {
                prop_assert!(count(dominant) >= count(level));
                if count(level) == count(dominant) {
                    prop_assert!(dominant <= level);
                }
            }
        }
    }
}

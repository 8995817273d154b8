use feed::{Marker, ViewerLocation};
use geo::distance_km;
use geo::precision::stable_total_cmp_f64;

/// Distance/rating bounds plus the current search text.
///
/// `0` is the documented "no bound" sentinel for both numeric fields, not a
/// zero-distance or zero-rating filter. Changing that would be an observable
/// behavior change, so it stays.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub max_distance_km: f64,
    pub min_rating: f64,
    pub search_text: String,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            max_distance_km: 0.0,
            min_rating: 0.0,
            search_text: String::new(),
        }
    }
}

/// A marker plus its great-circle distance from the viewer.
///
/// Produced only by `rank`; the source marker is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedMarker {
    pub marker: Marker,
    pub distance_from_viewer_km: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProximityError {
    /// The viewer has no usable coordinate; the caller owns user messaging.
    NoViewerLocation,
}

impl std::fmt::Display for ProximityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProximityError::NoViewerLocation => write!(f, "viewer location unavailable"),
        }
    }
}

impl std::error::Error for ProximityError {}

/// Annotate, filter, and sort markers relative to the viewer.
///
/// Steps:
/// 1. Drop markers with an invalid coordinate.
/// 2. Annotate the rest with distance from the viewer.
/// 3. Apply `max_distance_km` when it is `> 0`.
/// 4. Apply `min_rating` when it is `> 0`; an absent rating fails the bound.
/// 5. Stable sort ascending by distance; ties keep input order.
///
/// Ordering contract:
/// - The result is non-decreasing in `distance_from_viewer_km` and
///   deterministic for a given input order.
pub fn rank(
    markers: &[Marker],
    viewer: ViewerLocation,
    criteria: &FilterCriteria,
) -> Result<Vec<AnnotatedMarker>, ProximityError> {
    let Some(viewer_coord) = viewer.coordinate() else {
        return Err(ProximityError::NoViewerLocation);
    };

    let mut out: Vec<AnnotatedMarker> = Vec::with_capacity(markers.len());
    for marker in markers {
        if !marker.coordinate().is_valid() {
            continue;
        }
        let distance = distance_km(viewer_coord, marker.coordinate());
        if criteria.max_distance_km > 0.0 && distance > criteria.max_distance_km {
            continue;
        }
        if criteria.min_rating > 0.0 {
            match marker.rating() {
                Some(r) if r >= criteria.min_rating => {}
                _ => continue,
            }
        }
        out.push(AnnotatedMarker {
            marker: marker.clone(),
            distance_from_viewer_km: distance,
        });
    }

    out.sort_by(|a, b| {
        stable_total_cmp_f64(a.distance_from_viewer_km, b.distance_from_viewer_km)
    });

    Ok(out)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{FilterCriteria, ProximityError, rank};
    use feed::{Marker, MemberMarker, ViewerLocation};
    use geo::Coordinate;

    fn member(id: &str, lat: f64, lon: f64) -> Marker {
        Marker::Member(MemberMarker::new(id, id, Coordinate::new(lat, lon)))
    }

    fn rated(id: &str, lat: f64, lon: f64, rating: Option<f64>) -> Marker {
        let mut m = MemberMarker::new(id, id, Coordinate::new(lat, lon));
        m.rating = rating;
        Marker::Member(m)
    }

    fn ids(result: &[super::AnnotatedMarker]) -> Vec<&str> {
        result.iter().map(|a| a.marker.id()).collect()
    }

    #[test]
    fn colocated_member_is_included_at_zero_distance() {
        let viewer = Coordinate::new(22.7196, 75.8577);
        let markers = vec![member("m1", 22.7196, 75.8577)];
        let criteria = FilterCriteria {
            max_distance_km: 10.0,
            ..FilterCriteria::default()
        };

        let ranked = rank(&markers, ViewerLocation::Known(viewer), &criteria).unwrap();
        assert_eq!(ids(&ranked), vec!["m1"]);
        assert!(ranked[0].distance_from_viewer_km.abs() < 1e-9);
    }

    #[test]
    fn sorts_ascending_by_distance() {
        let viewer = ViewerLocation::Known(Coordinate::new(0.0, 0.0));
        let markers = vec![
            member("far", 0.0, 3.0),
            member("near", 0.0, 0.5),
            member("mid", 0.0, 1.0),
        ];

        let ranked = rank(&markers, viewer, &FilterCriteria::default()).unwrap();
        assert_eq!(ids(&ranked), vec!["near", "mid", "far"]);
        for pair in ranked.windows(2) {
            assert!(pair[0].distance_from_viewer_km <= pair[1].distance_from_viewer_km);
        }
    }

    #[test]
    fn equidistant_markers_keep_input_order() {
        let viewer = ViewerLocation::Known(Coordinate::new(0.0, 0.0));
        let markers = vec![
            member("b", 0.0, 1.0),
            member("a", 0.0, -1.0),
            member("c", 0.0, 1.0),
        ];

        let ranked = rank(&markers, viewer, &FilterCriteria::default()).unwrap();
        assert_eq!(ids(&ranked), vec!["b", "a", "c"]);
    }

    #[test]
    fn zero_max_distance_means_no_distance_bound() {
        let viewer = ViewerLocation::Known(Coordinate::new(0.0, 0.0));
        let markers = vec![member("antipode", 0.0, 179.9)];

        let ranked = rank(&markers, viewer, &FilterCriteria::default()).unwrap();
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn distance_bound_excludes_beyond_range() {
        let viewer = ViewerLocation::Known(Coordinate::new(0.0, 0.0));
        let markers = vec![member("near", 0.0, 0.05), member("far", 0.0, 2.0)];
        let criteria = FilterCriteria {
            max_distance_km: 10.0,
            ..FilterCriteria::default()
        };

        let ranked = rank(&markers, viewer, &criteria).unwrap();
        assert_eq!(ids(&ranked), vec!["near"]);
    }

    #[test]
    fn min_rating_excludes_low_and_absent_ratings() {
        let viewer = ViewerLocation::Known(Coordinate::new(0.0, 0.0));
        let markers = vec![
            rated("low", 0.0, 0.1, Some(3.0)),
            rated("unrated", 0.0, 0.2, None),
            rated("ok", 0.0, 0.3, Some(3.5)),
        ];
        let criteria = FilterCriteria {
            min_rating: 3.5,
            ..FilterCriteria::default()
        };

        let ranked = rank(&markers, viewer, &criteria).unwrap();
        assert_eq!(ids(&ranked), vec!["ok"]);
    }

    #[test]
    fn zero_min_rating_keeps_unrated_markers() {
        let viewer = ViewerLocation::Known(Coordinate::new(0.0, 0.0));
        let markers = vec![rated("unrated", 0.0, 0.1, None)];

        let ranked = rank(&markers, viewer, &FilterCriteria::default()).unwrap();
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn invalid_marker_coordinates_are_dropped_silently() {
        let viewer = ViewerLocation::Known(Coordinate::new(0.0, 0.0));
        let markers = vec![
            member("bad_lat", 91.0, 0.0),
            member("nan", f64::NAN, 0.0),
            member("good", 0.0, 0.1),
        ];

        let ranked = rank(&markers, viewer, &FilterCriteria::default()).unwrap();
        assert_eq!(ids(&ranked), vec!["good"]);
    }

    #[test]
    fn missing_viewer_location_is_a_caller_visible_condition() {
        let markers = vec![member("m1", 0.0, 0.0)];
        let err = rank(&markers, ViewerLocation::Unavailable, &FilterCriteria::default());
        assert_eq!(err, Err(ProximityError::NoViewerLocation));
    }
}

use crate::coord::Coordinate;

/// Mean Earth radius (kilometers).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates (kilometers), haversine form.
///
/// Contract:
/// - `distance_km(a, a) == 0.0`
/// - `distance_km(a, b) == distance_km(b, a)` (within float tolerance)
/// - Invalid input (non-finite or out-of-range components) yields
///   `f64::INFINITY` so downstream range filters exclude it; never panics.
///
/// The `sqrt`/`asin` argument is clamped to [0, 1] so float overshoot near
/// antipodal pairs cannot produce NaN.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    if !a.is_valid() || !b.is_valid() {
        return f64::INFINITY;
    }

    let lat_a = a.lat_deg.to_radians();
    let lat_b = b.lat_deg.to_radians();
    let d_lat = (b.lat_deg - a.lat_deg).to_radians();
    let d_lon = (b.lon_deg - a.lon_deg).to_radians();

    let sin_lat = (d_lat * 0.5).sin();
    let sin_lon = (d_lon * 0.5).sin();
    let h = sin_lat * sin_lat + lat_a.cos() * lat_b.cos() * sin_lon * sin_lon;

    2.0 * EARTH_RADIUS_KM * h.clamp(0.0, 1.0).sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::distance_km;
    use crate::coord::Coordinate;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn identical_points_are_zero() {
        let p = Coordinate::new(22.7196, 75.8577);
        assert_eq!(distance_km(p, p), 0.0);
    }

    #[test]
    fn symmetric() {
        let a = Coordinate::new(22.7196, 75.8577);
        let b = Coordinate::new(19.0760, 72.8777);
        assert_close(distance_km(a, b), distance_km(b, a), 1e-9);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 0.0);
        assert_close(distance_km(a, b), 111.19, 0.1);
    }

    #[test]
    fn antipodal_pair_is_finite() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let d = distance_km(a, b);
        assert!(d.is_finite());
        // Half the mean circumference.
        assert_close(d, std::f64::consts::PI * 6371.0, 1.0);
    }

    #[test]
    fn invalid_input_is_infinite_not_a_panic() {
        let good = Coordinate::new(10.0, 10.0);
        let bad = Coordinate::new(f64::NAN, 10.0);
        assert!(distance_km(good, bad).is_infinite());
        assert!(distance_km(bad, bad).is_infinite());
        assert!(distance_km(Coordinate::new(91.0, 0.0), good).is_infinite());
    }
}

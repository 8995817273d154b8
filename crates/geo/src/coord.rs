/// Geographic coordinate in WGS84 degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Coordinate {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl Coordinate {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    /// Both components finite and within WGS84 bounds
    /// (latitude in [-90, 90], longitude in [-180, 180]).
    pub fn is_valid(&self) -> bool {
        self.lat_deg.is_finite()
            && self.lon_deg.is_finite()
            && (-90.0..=90.0).contains(&self.lat_deg)
            && (-180.0..=180.0).contains(&self.lon_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::Coordinate;

    #[test]
    fn valid_within_bounds() {
        assert!(Coordinate::new(22.7196, 75.8577).is_valid());
        assert!(Coordinate::new(-90.0, 180.0).is_valid());
        assert!(Coordinate::new(90.0, -180.0).is_valid());
    }

    #[test]
    fn invalid_out_of_range_or_non_finite() {
        assert!(!Coordinate::new(90.5, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_valid());
    }
}

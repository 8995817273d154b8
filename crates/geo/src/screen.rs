use crate::coord::Coordinate;

/// Web Mercator latitude limit (degrees); poles are not representable.
pub const MERCATOR_LAT_LIMIT_DEG: f64 = 85.051_128_78;

/// Tile edge length in pixels.
pub const TILE_SIZE_PX: f64 = 256.0;

/// Deepest zoom the pixel math supports; larger values are clamped.
pub const MAX_PROJECTION_ZOOM: u8 = 30;

/// World size in pixels at `zoom` (256 × 2^z square).
///
/// `zoom` is clamped to `MAX_PROJECTION_ZOOM`, so any `u8` input yields a
/// finite size.
pub fn world_size_px(zoom: u8) -> f64 {
    TILE_SIZE_PX * f64::exp2(f64::from(zoom.min(MAX_PROJECTION_ZOOM)))
}

/// Project a coordinate to Web Mercator world pixels at `zoom`.
///
/// Latitude is clamped to the Mercator limit first, so the output is always
/// finite for valid coordinates. Returns `None` for invalid input.
pub fn project_px(coord: Coordinate, zoom: u8) -> Option<[f64; 2]> {
    if !coord.is_valid() {
        return None;
    }

    let size = world_size_px(zoom);
    let lat = coord
        .lat_deg
        .clamp(-MERCATOR_LAT_LIMIT_DEG, MERCATOR_LAT_LIMIT_DEG)
        .to_radians();

    let x = (coord.lon_deg + 180.0) / 360.0 * size;
    let y = (1.0 - ((lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI)) * 0.5 * size;

    Some([x, y])
}

/// Euclidean pixel distance between two projected points.
pub fn px_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

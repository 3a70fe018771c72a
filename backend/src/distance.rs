use geo_types::Coord;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two `(lon, lat)` vertices.
pub fn haversine_m(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let dlat = (b.y - a.y).to_radians();
    let dlon = (b.x - a.x).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Distances between consecutive vertices, in vertex order. M vertices give
/// M-1 distances.
pub fn sequential_distances(coords: &[Coord<f64>]) -> Vec<f64> {
    coords.windows(2).map(|w| haversine_m(w[0], w[1])).collect()
}

pub fn path_length_m(coords: &[Coord<f64>]) -> f64 {
    coords.windows(2).map(|w| haversine_m(w[0], w[1])).sum()
}

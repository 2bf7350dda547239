use shared::GeoPoint;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in metres on a spherical Earth.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    haversine_m(a, b) / 1_000.0
}

pub fn path_distance_m(path: &[GeoPoint]) -> f64 {
    path.windows(2).map(|w| haversine_m(w[0], w[1])).sum()
}

/// Pick up to `num_stops` path points spaced roughly evenly by distance.
///
/// The path is split into `num_stops + 1` equal lengths. Walking the path
/// segment by segment, the end point of the first segment that reaches the
/// next target distance is emitted and the target moves one spacing
/// further. Distance is accumulated from the path start and is never reset,
/// so a single long segment only ever yields one stop; the following
/// segments then catch up on the skipped targets. The path's own start is
/// never emitted. Returns an empty list for paths shorter than two points.
pub fn equidistant_points(path: &[GeoPoint], num_stops: usize) -> Vec<GeoPoint> {
    if path.len() < 2 {
        return Vec::new();
    }

    let spacing = path_distance_m(path) / (num_stops as f64 + 1.0);
    let mut result = Vec::with_capacity(num_stops);
    let mut target = spacing;
    let mut travelled = 0.0;

    for pair in path.windows(2) {
        let d = haversine_m(pair[0], pair[1]);
        if travelled + d >= target {
            result.push(pair[1]);
            target += spacing;
        }
        travelled += d;
    }

    result.truncate(num_stops);
    result
}

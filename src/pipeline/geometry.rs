use crate::error::GeometryError;
use crate::types::route::{GeoPoint, Stop};
use crate::types::tracking::Progress;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters on a spherical earth.
pub fn great_circle_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

    // rounding can push h marginally past 1 for antipodal points
    2.0 * EARTH_RADIUS_M * h.min(1.0).sqrt().asin()
}

/// Sum of segment lengths in meters; 0 for fewer than two points.
pub fn path_length(path: &[GeoPoint]) -> f64 {
    path.windows(2)
        .map(|pair| great_circle_distance(pair[0], pair[1]))
        .sum()
}

/// Point at fraction `t` of the path's length. `t` wraps modulo 1.
pub fn point_at_fraction(path: &[GeoPoint], t: f64) -> Result<GeoPoint, GeometryError> {
    let t = Progress::new(t).value();
    let total = path_length(path);
    walk_to(path, t * total)
}

/// Point `distance` meters from the path start. Negative distances clamp to
/// the first point, distances past the end clamp to the last.
pub fn point_at_distance(path: &[GeoPoint], distance: f64) -> Result<GeoPoint, GeometryError> {
    walk_to(path, distance.max(0.0))
}

/// Cumulative length from the path start to the vertex nearest `point`.
///
/// This snaps to vertices rather than projecting onto segments. Ties go to
/// the earliest vertex.
pub fn distance_along_path(path: &[GeoPoint], point: GeoPoint) -> Result<f64, GeometryError> {
    let nearest_idx = nearest_index(path.iter().copied(), point).ok_or(GeometryError::EmptyPath)?;
    Ok(path_length(&path[..=nearest_idx]))
}

/// The stop closest to `point`; ties go to the earliest stop.
pub fn nearest_stop(point: GeoPoint, stops: &[Stop]) -> Result<&Stop, GeometryError> {
    let idx = nearest_index(stops.iter().map(Stop::location), point)
        .ok_or(GeometryError::EmptyStops)?;
    Ok(&stops[idx])
}

fn nearest_index(candidates: impl Iterator<Item = GeoPoint>, point: GeoPoint) -> Option<usize> {
    let mut seen_any = false;
    let mut best_idx = 0;
    let mut best_d = f64::INFINITY;
    for (idx, candidate) in candidates.enumerate() {
        seen_any = true;
        let d = great_circle_distance(candidate, point);
        if d < best_d {
            best_d = d;
            best_idx = idx;
        }
    }
    seen_any.then_some(best_idx)
}

// Interpolates linearly in degree space inside the segment holding `target`.
fn walk_to(path: &[GeoPoint], target: f64) -> Result<GeoPoint, GeometryError> {
    let last = *path.last().ok_or(GeometryError::EmptyPath)?;

    let mut remaining = target;
    for pair in path.windows(2) {
        let seg = great_circle_distance(pair[0], pair[1]);
        if remaining <= seg {
            let f = if seg == 0.0 { 0.0 } else { remaining / seg };
            return Ok(interpolate(pair[0], pair[1], f));
        }
        remaining -= seg;
    }

    Ok(last)
}

fn interpolate(a: GeoPoint, b: GeoPoint, f: f64) -> GeoPoint {
    GeoPoint::new(a.lat + (b.lat - a.lat) * f, a.lng + (b.lng - a.lng) * f)
}

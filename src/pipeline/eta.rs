use rayon::prelude::*;

use crate::error::GeometryError;
use crate::pipeline::geometry::{
    distance_along_path, great_circle_distance, nearest_stop, path_length, point_at_distance,
};
use crate::types::route::{GeoPoint, Route};
use crate::types::tracking::{Eta, NearestStopEta, Progress, StopEta};

/// Sampling step along the path when measuring congestion overlap.
pub const CONGESTION_SAMPLE_STEP_M: f64 = 200.0;
/// A sample counts as congested when it is closer than this to a segment midpoint.
pub const CONGESTION_PROXIMITY_M: f64 = 100.0;
/// Speed reduction applied when the whole remaining distance is congested.
pub const MAX_CONGESTION_PENALTY: f64 = 0.4;

/// Distance the bus still has to travel to reach `target_along` on a
/// closed loop of length `total_length`.
pub fn forward_distance(bus_along: f64, target_along: f64, total_length: f64) -> f64 {
    let d = target_along - bus_along;
    if d < 0.0 {
        d + total_length
    } else {
        d
    }
}

/// Seconds until the bus at `bus_along` reaches `target_along`, slowed down
/// by the share of the way that runs through congestion.
pub fn estimate_eta(
    route: &Route,
    bus_along: f64,
    target_along: f64,
    base_speed_ms: f64,
) -> Result<Eta, GeometryError> {
    let path = route.resolved_path();
    let total = path_length(&path);
    let d = forward_distance(bus_along, target_along, total);
    if !d.is_finite() {
        return Ok(Eta::Unknown);
    }

    let mut factor = 1.0;
    if !route.congestion.is_empty() {
        let portion = congestion_portion(&path, bus_along, d, &route.congestion)?;
        factor = 1.0 - MAX_CONGESTION_PENALTY * portion.clamp(0.0, 1.0);
    }

    let effective_speed = base_speed_ms * factor;
    if !effective_speed.is_finite() || effective_speed <= 0.0 {
        return Ok(Eta::Unknown);
    }

    Ok(Eta::from_seconds(d / effective_speed))
}

/// Fraction of `distance` meters ahead of `start_along` that lies in a
/// congested zone, sampled every [`CONGESTION_SAMPLE_STEP_M`].
///
/// At most one lap is sampled; further laps pass the same zones, so the
/// one-lap fraction stands for the whole distance.
pub fn congestion_portion(
    path: &[GeoPoint],
    start_along: f64,
    distance: f64,
    segments: &[Vec<GeoPoint>],
) -> Result<f64, GeometryError> {
    if !distance.is_finite() {
        return Ok(0.0);
    }

    let total = path_length(path);
    let mut within = 0.0;
    let mut covered = 0.0;
    let mut remaining = distance.min(total.max(CONGESTION_SAMPLE_STEP_M));
    let mut cursor = start_along;

    while remaining > 0.0 {
        let step = CONGESTION_SAMPLE_STEP_M.min(remaining);
        if remaining - step == remaining {
            break;
        }
        covered += step;
        remaining -= step;

        let sample = point_at_distance(path, cursor + step)?;
        if is_congested(sample, segments) {
            within += step;
        }

        cursor += step;
        if cursor > total {
            cursor -= total;
        }
    }

    Ok(if covered > 0.0 { within / covered } else { 0.0 })
}

/// True when `point` is near the midpoint of any congestion segment edge.
pub fn is_congested(point: GeoPoint, segments: &[Vec<GeoPoint>]) -> bool {
    segments.iter().any(|segment| {
        segment.windows(2).any(|pair| {
            let mid = GeoPoint::new(
                (pair[0].lat + pair[1].lat) / 2.0,
                (pair[0].lng + pair[1].lng) / 2.0,
            );
            great_circle_distance(mid, point) < CONGESTION_PROXIMITY_M
        })
    })
}

/// ETA for every stop on the route, in stop-list order.
pub fn stop_etas(route: &Route, bus_along: f64, speed_ms: f64) -> Result<Vec<StopEta>, GeometryError> {
    let path = route.resolved_path();

    route
        .stops
        .par_iter()
        .enumerate()
        .map(|(index, stop)| -> Result<StopEta, GeometryError> {
            let distance_along_m = distance_along_path(&path, stop.location())?;
            let eta = estimate_eta(route, bus_along, distance_along_m, speed_ms)?;
            Ok(StopEta {
                index,
                name: stop.name.clone(),
                distance_along_m,
                eta,
            })
        })
        .collect()
}

/// Bus distance along the route when it is simulated at `progress`.
pub fn simulated_distance_along(route: &Route, progress: Progress) -> f64 {
    progress.value() * path_length(&route.resolved_path())
}

/// ETA from the simulated bus to the stop nearest `user`. Congestion is not
/// taken into account here.
pub fn eta_to_nearest_stop(
    route: &Route,
    user: GeoPoint,
    progress: Progress,
    speed_ms: f64,
) -> Result<NearestStopEta, GeometryError> {
    let stop = nearest_stop(user, &route.stops)?;
    let path = route.resolved_path();
    let total = path_length(&path);
    let bus_along = progress.value() * total;
    let stop_along = distance_along_path(&path, stop.location())?;
    let d = forward_distance(bus_along, stop_along, total);

    let eta = if speed_ms > 0.0 {
        Eta::from_seconds(d / speed_ms)
    } else {
        Eta::Unknown
    };

    tracing::debug!("Nearest stop to user is {} ({:.0} m ahead of bus)", stop.name, d);

    Ok(NearestStopEta {
        stop_name: stop.name.clone(),
        distance_m: d,
        eta,
    })
}

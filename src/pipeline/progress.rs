use crate::types::tracking::Progress;

/// Moves `progress` forward by the distance covered at `speed_ms` over
/// `elapsed_secs`, looping back to the start at the end of the path.
pub fn advance(progress: Progress, speed_ms: f64, elapsed_secs: f64, path_length_m: f64) -> Progress {
    if path_length_m <= f64::EPSILON || !path_length_m.is_finite() {
        return progress;
    }

    let advance_m = speed_ms * elapsed_secs;
    if !advance_m.is_finite() {
        return progress;
    }

    Progress::new(progress.value() + advance_m / path_length_m)
}

/// Maps an absolute distance along a loop of `path_length_m` to progress.
pub fn from_distance(distance_m: f64, path_length_m: f64) -> Progress {
    if path_length_m <= f64::EPSILON {
        return Progress::START;
    }
    Progress::new(distance_m / path_length_m)
}

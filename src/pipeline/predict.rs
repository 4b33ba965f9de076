use crate::types::tracking::SpeedSample;

/// How many recent samples a tracker keeps for trend estimation.
pub const SAMPLE_WINDOW: usize = 5;
pub const DEFAULT_MIN_SAMPLES: usize = 3;

const ACCEL_GAIN: f64 = 0.02;
const MAX_ADJUSTMENT: f64 = 0.15;

/// Speed multiplier in `[0.85, 1.15]` derived from the mean acceleration
/// across the most recent samples (oldest first).
///
/// Fewer than `min_samples` samples, or no pair with a positive time delta,
/// yields the neutral factor 1.
pub fn acceleration_factor(samples: &[SpeedSample], min_samples: usize) -> f64 {
    let window = &samples[samples.len().saturating_sub(SAMPLE_WINDOW)..];
    if window.len() < min_samples {
        return 1.0;
    }

    let mut sum = 0.0;
    let mut count = 0usize;
    for pair in window.windows(2) {
        let dt = (pair[1].recorded_at - pair[0].recorded_at).num_milliseconds() as f64 / 1000.0;
        if dt <= 0.0 {
            continue;
        }
        let dv = sanitize(pair[1].speed_kmh) - sanitize(pair[0].speed_kmh);
        sum += dv / dt;
        count += 1;
    }

    let accel = if count > 0 { sum / count as f64 } else { 0.0 };
    if !accel.is_finite() {
        return 1.0;
    }

    1.0 + (accel * ACCEL_GAIN).clamp(-MAX_ADJUSTMENT, MAX_ADJUSTMENT)
}

/// Speed in m/s to project ETAs with after a live report. A stationary or
/// missing reading falls back to the base speed.
pub fn live_speed_ms(reported_kmh: f64, base_speed_kmh: f64, factor: f64) -> f64 {
    let kmh = if reported_kmh > 0.0 {
        reported_kmh
    } else {
        base_speed_kmh
    };
    kmh * factor / 3.6
}

fn sanitize(speed: f64) -> f64 {
    if speed.is_finite() {
        speed
    } else {
        0.0
    }
}

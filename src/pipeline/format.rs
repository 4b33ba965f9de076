pub const UNKNOWN_ETA: &str = "–";

/// Human-readable duration: `"1h 5m"`, `"3m 20s"` or `"42s"`.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() {
        seconds.round().max(0.0) as u64
    } else {
        0
    };
    let minutes = total / 60;
    let secs = total % 60;

    if minutes >= 60 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else if minutes >= 1 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

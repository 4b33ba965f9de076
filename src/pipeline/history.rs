use chrono::{DateTime, Utc};

use crate::types::tracking::HistoryFrame;

/// Frame recorded closest to `target`. Earlier frames win ties.
pub fn nearest_frame(history: &[HistoryFrame], target: DateTime<Utc>) -> Option<&HistoryFrame> {
    let mut best: Option<(&HistoryFrame, i64)> = None;
    for frame in history {
        let diff = (frame.created_at - target).num_milliseconds().abs();
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((frame, diff)),
        }
    }
    best.map(|(frame, _)| frame)
}

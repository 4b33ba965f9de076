use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;

use crate::error::GeometryError;
use crate::pipeline::geometry::{distance_along_path, path_length, point_at_fraction};
use crate::pipeline::{eta, predict, progress};
use crate::types::route::{GeoPoint, Route};
use crate::types::tracking::{PositionUpdate, Progress, SpeedSample, StopEta};

const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Per-bus tracking state for every bus being followed.
#[derive(Clone)]
pub struct FleetState {
    trackers: Arc<DashMap<String, BusTracker>>,
    limiter: RateLimiter,
}

struct BusTracker {
    route_id: String,
    progress: Progress,
    last_tick: Instant,
    last_seen: Instant,
    samples: VecDeque<SpeedSample>,
    live: Option<LiveFix>,
}

struct LiveFix {
    position: GeoPoint,
    speed_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BusSnapshot {
    pub bus_id: String,
    pub route_id: String,
    pub position: GeoPoint,
    pub progress: Progress,
    pub speed_ms: f64,
    pub live: bool,
    pub stop_etas: Vec<StopEta>,
}

impl FleetState {
    pub fn new(rate_limit_per_minute: u32) -> Self {
        Self {
            trackers: Arc::new(DashMap::new()),
            limiter: RateLimiter::new(rate_limit_per_minute, RATE_WINDOW),
        }
    }

    /// Starts following `bus_id` on `route_id` from the start of the route.
    pub fn register(&self, bus_id: &str, route_id: &str, now: Instant) {
        self.trackers.insert(
            bus_id.to_string(),
            BusTracker {
                route_id: route_id.to_string(),
                progress: Progress::START,
                last_tick: now,
                last_seen: now,
                samples: VecDeque::with_capacity(predict::SAMPLE_WINDOW),
                live: None,
            },
        );
        tracing::debug!("Tracking bus {} on route {}", bus_id, route_id);
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    pub fn progress(&self, bus_id: &str) -> Option<Progress> {
        self.trackers.get(bus_id).map(|t| t.progress)
    }

    pub fn is_live(&self, bus_id: &str) -> Option<bool> {
        self.trackers.get(bus_id).map(|t| t.live.is_some())
    }

    /// Advances a simulated bus by the time elapsed since its last tick and
    /// recomputes its stop ETAs. Live buses keep their reported position.
    ///
    /// Returns `Ok(None)` for buses that are not tracked.
    pub fn tick(
        &self,
        bus_id: &str,
        route: &Route,
        simulated_speed_ms: f64,
        now: Instant,
    ) -> Result<Option<BusSnapshot>, GeometryError> {
        let path = route.resolved_path();
        let total = path_length(&path);

        let (progress, live) = {
            let Some(mut tracker) = self.trackers.get_mut(bus_id) else {
                return Ok(None);
            };
            let elapsed = now.saturating_duration_since(tracker.last_tick).as_secs_f64();
            tracker.last_tick = now;
            if tracker.live.is_none() {
                tracker.progress = progress::advance(tracker.progress, simulated_speed_ms, elapsed, total);
            }
            let live = tracker.live.as_ref().map(|fix| (fix.position, fix.speed_ms));
            (tracker.progress, live)
        };

        let (position, bus_along, speed_ms) = match live {
            Some((position, speed_ms)) => (position, distance_along_path(&path, position)?, speed_ms),
            None => (
                point_at_fraction(&path, progress.value())?,
                progress.value() * total,
                simulated_speed_ms,
            ),
        };

        let stop_etas = eta::stop_etas(route, bus_along, speed_ms)?;

        Ok(Some(BusSnapshot {
            bus_id: bus_id.to_string(),
            route_id: route.id.clone(),
            position,
            progress,
            speed_ms,
            live: live.is_some(),
            stop_etas,
        }))
    }

    /// Applies a live position report. Reports over the per-bus rate limit
    /// still refresh speed and ETAs but leave the displayed position alone.
    ///
    /// Returns `Ok(None)` for buses that are not tracked.
    pub fn apply_position(
        &self,
        update: &PositionUpdate,
        route: &Route,
        base_speed_kmh: f64,
        now: Instant,
    ) -> Result<Option<BusSnapshot>, GeometryError> {
        let path = route.resolved_path();
        let total = path_length(&path);

        let (position, bus_along, speed_ms, progress) = {
            let Some(mut tracker) = self.trackers.get_mut(&update.bus_id) else {
                return Ok(None);
            };
            let allowed = self.limiter.allow(&update.bus_id, now);

            tracker.samples.push_back(update.sample());
            while tracker.samples.len() > predict::SAMPLE_WINDOW {
                tracker.samples.pop_front();
            }
            let samples: Vec<SpeedSample> = tracker.samples.iter().copied().collect();
            let factor = predict::acceleration_factor(&samples, predict::DEFAULT_MIN_SAMPLES);
            let speed_ms = predict::live_speed_ms(update.speed_kmh, base_speed_kmh, factor);

            let position = match (&tracker.live, allowed) {
                (Some(fix), false) => fix.position,
                _ => update.location(),
            };
            if !allowed {
                tracing::debug!("Rate limit reached for bus {}, holding position", update.bus_id);
            }

            let bus_along = distance_along_path(&path, position)?;
            tracker.progress = progress::from_distance(bus_along, total);
            tracker.live = Some(LiveFix { position, speed_ms });
            tracker.last_seen = now;
            tracker.last_tick = now;

            (position, bus_along, speed_ms, tracker.progress)
        };

        let stop_etas = eta::stop_etas(route, bus_along, speed_ms)?;

        Ok(Some(BusSnapshot {
            bus_id: update.bus_id.clone(),
            route_id: route.id.clone(),
            position,
            progress,
            speed_ms,
            live: true,
            stop_etas,
        }))
    }

    /// Returns live buses that have not reported within `ttl` to simulation,
    /// starting from their last known position. Returns their ids.
    pub fn evict_stale(&self, ttl: Duration, now: Instant) -> Vec<String> {
        let mut stale = Vec::new();
        for mut entry in self.trackers.iter_mut() {
            let tracker = entry.value_mut();
            if tracker.live.is_none() || now.saturating_duration_since(tracker.last_seen) < ttl {
                continue;
            }
            tracker.live = None;
            tracker.samples.clear();
            tracker.last_tick = now;
            self.limiter.forget(entry.key());
            stale.push(entry.key().clone());
        }
        tracing::info!(
            "Stale bus eviction complete. Back to simulation: {}, tracking {}",
            stale.len(),
            self.trackers.len()
        );
        stale
    }
}

/// Fixed-window limiter keyed by bus id.
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<DashMap<String, Bucket>>,
    max_per_window: u32,
    window: Duration,
}

struct Bucket {
    window_start: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(max_per_window: u32, window: Duration) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            max_per_window,
            window,
        }
    }

    pub fn allow(&self, id: &str, now: Instant) -> bool {
        let mut bucket = self.buckets.entry(id.to_string()).or_insert_with(|| Bucket {
            window_start: now,
            count: 0,
        });

        if now.saturating_duration_since(bucket.window_start) >= self.window {
            bucket.window_start = now;
            bucket.count = 0;
        }
        if bucket.count >= self.max_per_window {
            return false;
        }
        bucket.count += 1;
        true
    }

    pub fn forget(&self, id: &str) {
        self.buckets.remove(id);
    }
}

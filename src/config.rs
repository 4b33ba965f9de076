use std::path::PathBuf;
use std::time::Duration;

use crate::types::route::GeoPoint;

const DEFAULT_TICK_MS: u64 = 1000;
const BATTERY_SAVER_TICK_MS: u64 = 5000;
const TRAFFIC_FACTOR: f64 = 0.6;

#[derive(Debug, Clone)]
pub struct Config {
    pub routes_file: PathBuf,
    pub route_id: Option<String>,
    pub bus_id: Option<String>,
    pub tick_interval: Duration,
    pub base_speed_kmh: f64,
    pub traffic_factor: f64,
    pub rate_limit_per_minute: u32,
    pub geofence_radius_m: f64,
    pub stale_bus_ttl: Duration,
    pub user_location: Option<GeoPoint>,
}

impl Config {
    pub fn from_env() -> Self {
        let routes_file = std::env::var("ROUTES_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("assets/data/routes.json"));

        let route_id = std::env::var("ROUTE_ID").ok().filter(|s| !s.is_empty());
        let bus_id = std::env::var("BUS_ID").ok().filter(|s| !s.is_empty());

        let battery_saver = env_flag("BATTERY_SAVER");
        let tick_ms = if battery_saver {
            BATTERY_SAVER_TICK_MS
        } else {
            std::env::var("TICK_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TICK_MS)
        };

        let base_speed_kmh = std::env::var("BASE_SPEED_KMH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(28.0);

        let traffic_factor = if env_flag("TRAFFIC_ENABLED") {
            TRAFFIC_FACTOR
        } else {
            1.0
        };

        let rate_limit_per_minute = std::env::var("RATE_LIMIT_PER_MINUTE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        let geofence_radius_m = std::env::var("GEOFENCE_RADIUS_M")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(200.0);

        let stale_bus_ttl_seconds = std::env::var("STALE_BUS_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(300);

        let user_location = match (env_f64("USER_LAT"), env_f64("USER_LNG")) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)).filter(GeoPoint::is_valid),
            _ => None,
        };

        Self {
            routes_file,
            route_id,
            bus_id,
            tick_interval: Duration::from_millis(tick_ms.max(1)),
            base_speed_kmh,
            traffic_factor,
            rate_limit_per_minute,
            geofence_radius_m,
            stale_bus_ttl: Duration::from_secs(stale_bus_ttl_seconds),
            user_location,
        }
    }

    /// Simulated bus speed in m/s with the traffic factor applied.
    pub fn simulated_speed_ms(&self) -> f64 {
        self.base_speed_kmh * self.traffic_factor / 3.6
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn env_f64(name: &str) -> Option<f64> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

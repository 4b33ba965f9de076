use std::sync::Arc;
use std::time::Instant;

use bustrack_rs::config::Config;
use bustrack_rs::error::AppError;
use bustrack_rs::pipeline::eta::eta_to_nearest_stop;
use bustrack_rs::pipeline::geofence::Geofence;
use bustrack_rs::pipeline::load;
use bustrack_rs::state::{BusSnapshot, FleetState};
use bustrack_rs::types::tracking::PositionUpdate;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bustrack_rs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run(Config::from_env()).await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), AppError> {
    let catalog = load::load_catalog(&config.routes_file)?;

    let route = match &config.route_id {
        Some(id) => catalog
            .find(id)
            .ok_or_else(|| AppError::RouteNotFound(id.clone()))?,
        None => catalog
            .routes
            .first()
            .ok_or_else(|| AppError::RouteNotFound("<first>".to_string()))?,
    };
    let route = Arc::new(route.clone());

    let bus_ids: Vec<String> = match &config.bus_id {
        Some(id) => {
            let bus = route
                .find_bus(id)
                .ok_or_else(|| AppError::BusNotFound(id.clone()))?;
            vec![bus.id.clone()]
        }
        // routes without buses are simulated as a single vehicle
        None if route.buses.is_empty() => vec![route.id.clone()],
        None => route.buses.iter().map(|bus| bus.id.clone()).collect(),
    };

    let fleet = FleetState::new(config.rate_limit_per_minute);
    let now = Instant::now();
    for bus_id in &bus_ids {
        fleet.register(bus_id, &route.id, now);
    }

    tracing::info!(
        "Simulating route {} ({} stops, {} buses) every {:?}",
        route.name,
        route.stops.len(),
        fleet.len(),
        config.tick_interval
    );

    // Stale live buses
    let eviction_fleet = fleet.clone();
    let eviction_ttl = config.stale_bus_ttl;
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(300)).await;
            for bus_id in eviction_fleet.evict_stale(eviction_ttl, Instant::now()) {
                tracing::info!("Bus {} went quiet, back to simulation", bus_id);
            }
        }
    });

    // Live position reports as JSON lines on stdin
    let feed_fleet = fleet.clone();
    let feed_route = route.clone();
    let base_speed_kmh = config.base_speed_kmh;
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!("Position feed closed: {}", err);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let update: PositionUpdate = match serde_json::from_str(&line) {
                Ok(update) => update,
                Err(err) => {
                    tracing::warn!("Ignoring malformed position update: {}", err);
                    continue;
                }
            };
            if feed_fleet.is_live(&update.bus_id) == Some(false) {
                tracing::info!("Bus {} switched to live tracking", update.bus_id);
            }
            match feed_fleet.apply_position(&update, &feed_route, base_speed_kmh, Instant::now()) {
                Ok(Some(snapshot)) => log_snapshot(&snapshot),
                Ok(None) => tracing::warn!("Position update for unknown bus {}", update.bus_id),
                Err(err) => tracing::warn!("Failed to apply position update: {}", err),
            }
        }
    });

    let mut geofence = Geofence::new(config.geofence_radius_m);
    if let Some(user) = config.user_location {
        match geofence.retarget(user, &route.stops) {
            Ok(stop) => {
                tracing::info!("Watching {} zone for user at ({:.5}, {:.5})", stop.name, user.lat, user.lng)
            }
            Err(err) => tracing::warn!("Geofence disabled: {}", err),
        }
    }

    let mut interval = tokio::time::interval(config.tick_interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = Instant::now();
                for bus_id in &bus_ids {
                    match fleet.tick(bus_id, &route, config.simulated_speed_ms(), now) {
                        Ok(Some(snapshot)) => log_snapshot(&snapshot),
                        Ok(None) => {}
                        Err(err) => tracing::warn!("Failed to tick bus {}: {}", bus_id, err),
                    }
                }
                if let (Some(user), Some(bus_id)) = (config.user_location, bus_ids.first()) {
                    let progress = fleet.progress(bus_id).unwrap_or_default();
                    match eta_to_nearest_stop(&route, user, progress, config.simulated_speed_ms()) {
                        Ok(nearest) => {
                            tracing::info!("ETA to nearest stop ({}): {}", nearest.stop_name, nearest.eta)
                        }
                        Err(err) => tracing::warn!("No ETA to nearest stop: {}", err),
                    }
                    geofence.check(user);
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutting down");
                return Ok(());
            }
        }
    }
}

fn log_snapshot(snapshot: &BusSnapshot) {
    let etas: Vec<String> = snapshot
        .stop_etas
        .iter()
        .map(|stop| format!("{}={}", stop.name, stop.eta))
        .collect();

    tracing::info!(
        "Bus {} at ({:.5}, {:.5}) {:.0} km/h{} | {}",
        snapshot.bus_id,
        snapshot.position.lat,
        snapshot.position.lng,
        snapshot.speed_ms * 3.6,
        if snapshot.live { " [live]" } else { "" },
        etas.join(", ")
    );
}

use std::path::Path;

use crate::error::LoadError;
use crate::types::route::{GeoPoint, Route, RouteCatalog};

pub fn parse_catalog(bytes: &[u8]) -> Result<RouteCatalog, LoadError> {
    let catalog: RouteCatalog = serde_json::from_slice(bytes)?;

    if catalog.routes.is_empty() {
        return Err(LoadError::NoRoutes);
    }
    for route in &catalog.routes {
        validate_route(route)?;
    }

    Ok(catalog)
}

pub fn load_catalog(path: &Path) -> Result<RouteCatalog, LoadError> {
    let bytes = std::fs::read(path)?;
    let catalog = parse_catalog(&bytes)?;

    tracing::info!(
        "Loaded {} routes from {}",
        catalog.routes.len(),
        path.display()
    );

    Ok(catalog)
}

fn validate_route(route: &Route) -> Result<(), LoadError> {
    if route.resolved_path().is_empty() {
        return Err(LoadError::EmptyPath(route.id.clone()));
    }

    let stops = route.stops.iter().map(|s| s.location());
    let path = route.path.iter().flatten().copied();
    let congestion = route.congestion.iter().flatten().copied();

    match stops.chain(path).chain(congestion).find(|p| !p.is_valid()) {
        Some(GeoPoint { lat, lng }) => Err(LoadError::InvalidCoordinate {
            route: route.id.clone(),
            lat,
            lng,
        }),
        None => Ok(()),
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Invalid input: path has no points")]
    EmptyPath,
    #[error("Invalid input: stop list is empty")]
    EmptyStops,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read route catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid route catalog JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Route catalog contains no routes")]
    NoRoutes,
    #[error("Route {0} has no path and no stops to derive one from")]
    EmptyPath(String),
    #[error("Invalid coordinate in route {route}: ({lat}, {lng})")]
    InvalidCoordinate { route: String, lat: f64, lng: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("Route not found: {0}")]
    RouteNotFound(String),
    #[error("Bus not found: {0}")]
    BusNotFound(String),
}

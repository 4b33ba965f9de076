use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees. Serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl From<GeoPoint> for (f64, f64) {
    fn from(point: GeoPoint) -> Self {
        (point.lat, point.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, alias = "volume", skip_serializing_if = "Option::is_none")]
    pub passengers: Option<u32>,
}

impl Stop {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
            passengers: None,
        }
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub driver: Option<Driver>,
}

impl Bus {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(alias = "code")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<GeoPoint>>,
    #[serde(default)]
    pub congestion: Vec<Vec<GeoPoint>>,
    #[serde(default)]
    pub buses: Vec<Bus>,
}

impl Route {
    /// The polyline the bus travels: the explicit path when one was supplied,
    /// otherwise the stops in list order.
    pub fn resolved_path(&self) -> Cow<'_, [GeoPoint]> {
        match &self.path {
            Some(path) => Cow::Borrowed(path.as_slice()),
            None => Cow::Owned(self.stops.iter().map(Stop::location).collect()),
        }
    }

    pub fn find_bus(&self, id: &str) -> Option<&Bus> {
        self.buses
            .iter()
            .find(|bus| bus.id == id || bus.name.as_deref() == Some(id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteCatalog {
    pub routes: Vec<Route>,
}

impl RouteCatalog {
    pub fn find(&self, id: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.id == id)
    }
}

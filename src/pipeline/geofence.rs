use crate::error::GeometryError;
use crate::pipeline::geometry::{great_circle_distance, nearest_stop};
use crate::types::route::{GeoPoint, Stop};

pub const DEFAULT_RADIUS_M: f64 = 200.0;

#[derive(Debug, Clone, PartialEq)]
pub enum GeofenceEvent {
    Entered(String),
    Left(String),
}

/// Zone around a single stop. The caller owns it and feeds it positions.
#[derive(Debug, Clone)]
pub struct Geofence {
    radius_m: f64,
    stop: Option<Stop>,
    inside: bool,
}

impl Default for Geofence {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS_M)
    }
}

impl Geofence {
    pub fn new(radius_m: f64) -> Self {
        Self {
            radius_m,
            stop: None,
            inside: false,
        }
    }

    pub fn stop(&self) -> Option<&Stop> {
        self.stop.as_ref()
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    /// Points the fence at the stop nearest `reference`.
    pub fn retarget(&mut self, reference: GeoPoint, stops: &[Stop]) -> Result<&Stop, GeometryError> {
        let stop = nearest_stop(reference, stops)?.clone();
        if self.stop.as_ref().map(|s| &s.name) != Some(&stop.name) {
            self.inside = false;
        }
        Ok(&*self.stop.insert(stop))
    }

    /// Returns an event when `position` crosses the fence boundary.
    pub fn check(&mut self, position: GeoPoint) -> Option<GeofenceEvent> {
        let stop = self.stop.as_ref()?;
        let d = great_circle_distance(position, stop.location());
        let was_inside = self.inside;
        self.inside = d <= self.radius_m;

        match (was_inside, self.inside) {
            (false, true) => {
                tracing::info!("Entered {} zone", stop.name);
                Some(GeofenceEvent::Entered(stop.name.clone()))
            }
            (true, false) => {
                tracing::info!("Left {} zone", stop.name);
                Some(GeofenceEvent::Left(stop.name.clone()))
            }
            _ => None,
        }
    }
}

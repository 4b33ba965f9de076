use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::route::GeoPoint;

/// Fractional position along a closed-loop path, always in `[0, 1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Progress(f64);

impl Progress {
    pub const START: Progress = Progress(0.0);

    pub fn new(t: f64) -> Self {
        if !t.is_finite() {
            return Self::START;
        }
        let wrapped = t.rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for tiny negative inputs
        if wrapped >= 1.0 {
            Self::START
        } else {
            Progress(wrapped)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Progress {
    fn from(t: f64) -> Self {
        Progress::new(t)
    }
}

impl From<Progress> for f64 {
    fn from(progress: Progress) -> Self {
        progress.0
    }
}

/// One observed (speed, timestamp) reading used for acceleration trends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSample {
    pub speed_kmh: f64,
    pub recorded_at: DateTime<Utc>,
}

/// A live position push for one bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub bus_id: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub speed_kmh: f64,
    #[serde(default = "Utc::now")]
    pub recorded_at: DateTime<Utc>,
}

impl PositionUpdate {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    pub fn sample(&self) -> SpeedSample {
        SpeedSample {
            speed_kmh: self.speed_kmh,
            recorded_at: self.recorded_at,
        }
    }
}

/// Estimated time of arrival. `Unknown` replaces non-finite or
/// non-positive-speed results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "seconds")]
pub enum Eta {
    Known(f64),
    Unknown,
}

impl Eta {
    pub fn from_seconds(seconds: f64) -> Self {
        if seconds.is_finite() {
            Eta::Known(seconds)
        } else {
            Eta::Unknown
        }
    }

    pub fn seconds(self) -> Option<f64> {
        match self {
            Eta::Known(seconds) => Some(seconds),
            Eta::Unknown => None,
        }
    }
}

impl fmt::Display for Eta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eta::Known(seconds) => f.write_str(&crate::pipeline::format::format_duration(*seconds)),
            Eta::Unknown => f.write_str(crate::pipeline::format::UNKNOWN_ETA),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopEta {
    pub index: usize,
    pub name: String,
    pub distance_along_m: f64,
    pub eta: Eta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestStopEta {
    pub stop_name: String,
    pub distance_m: f64,
    pub eta: Eta,
}

/// A recorded position used for history playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryFrame {
    pub lat: f64,
    pub lng: f64,
    pub created_at: DateTime<Utc>,
}

impl HistoryFrame {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

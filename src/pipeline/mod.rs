pub mod eta;
pub mod format;
pub mod geofence;
pub mod geometry;
pub mod history;
pub mod load;
pub mod predict;
pub mod progress;

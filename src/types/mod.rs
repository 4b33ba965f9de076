pub mod route;
pub mod tracking;

pub mod config;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod types;

pub mod config;
pub mod error;
pub mod policies;
pub mod service;
pub mod telemetry;

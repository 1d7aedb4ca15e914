pub mod config;
pub mod drain;
pub mod telemetry;

pub mod config;
pub mod error;
pub mod function;
pub mod relay;
mod routes;
pub mod startup;
pub mod state;
pub mod telemetry;
pub mod upstream;

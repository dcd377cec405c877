//! Scenario configuration and world construction.

mod build;
mod params;

pub use build::build_scenario;
pub use params::{ConfigError, SimulationParams, TickConfig};

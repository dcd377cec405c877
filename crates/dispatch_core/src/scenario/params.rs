use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dispatch::DispatchConfig;
use crate::graph::GridLayout;
use crate::simulator::DEFAULT_STEP_SIZE;

/// Default vehicle tick: 10 updates per simulated second.
const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Default driver roster broadcast interval.
const DEFAULT_ROSTER_INTERVAL_MS: u64 = 2_000;

const DEFAULT_VEHICLE_COUNT: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid simulation config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("rating range {min}..={max} is empty")]
    RatingRange { min: f64, max: f64 },

    #[error("grid must contain at least one node")]
    EmptyGrid,
}

/// Timer intervals read by the repeating systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Resource)]
pub struct TickConfig {
    pub tick_interval_ms: u64,
    pub roster_interval_ms: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            roster_interval_ms: DEFAULT_ROSTER_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Seed for every RNG in the world. `None` draws from entropy.
    pub seed: Option<u64>,
    pub grid: GridLayout,
    pub vehicle_count: usize,
    /// Coordinate distance a vehicle covers per tick.
    pub step_size: f64,
    pub tick_interval_ms: u64,
    pub roster_interval_ms: u64,
    pub dispatch: DispatchConfig,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            seed: None,
            grid: GridLayout::default(),
            vehicle_count: DEFAULT_VEHICLE_COUNT,
            step_size: DEFAULT_STEP_SIZE,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            roster_interval_ms: DEFAULT_ROSTER_INTERVAL_MS,
            dispatch: DispatchConfig::default(),
        }
    }
}

impl SimulationParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_grid(mut self, grid: GridLayout) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_vehicle_count(mut self, count: usize) -> Self {
        self.vehicle_count = count;
        self
    }

    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_tick_interval_ms(mut self, interval_ms: u64) -> Self {
        self.tick_interval_ms = interval_ms;
        self
    }

    pub fn with_roster_interval_ms(mut self, interval_ms: u64) -> Self {
        self.roster_interval_ms = interval_ms;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let params: Self = serde_json::from_str(raw)?;
        params.validate()?;
        Ok(params)
    }

    pub fn tick_config(&self) -> TickConfig {
        TickConfig {
            tick_interval_ms: self.tick_interval_ms,
            roster_interval_ms: self.roster_interval_ms,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        let positive = [
            ("step_size", self.step_size),
            ("tick_interval_ms", self.tick_interval_ms as f64),
            ("roster_interval_ms", self.roster_interval_ms as f64),
            ("grid.spacing", self.grid.spacing),
            ("dispatch.predictive_horizon_secs", self.dispatch.predictive_horizon_secs),
            ("dispatch.pricing.safety_surcharge", self.dispatch.pricing.safety_surcharge),
            ("dispatch.route.avg_speed_kmh", self.dispatch.route.avg_speed_kmh),
            ("dispatch.route.fallback_duration_secs", self.dispatch.route.fallback_duration_secs),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        let (min, max) = (self.dispatch.rating_min, self.dispatch.rating_max);
        if !(min <= max) {
            return Err(ConfigError::RatingRange { min, max });
        }
        Ok(())
    }
}

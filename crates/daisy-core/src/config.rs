//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the world grid
    pub width: i32,
    /// Height of the world grid
    pub height: i32,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Global temperature at startup
    pub initial_temperature: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            seed: 0,
            initial_temperature: 15.0,
        }
    }
}

/// Growth, death and albedo constants of the climate model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateParams {
    /// Chance per tick that a barren cell sprouts an organism
    pub growth_threshold: f64,
    /// Temperature at which organisms never die
    pub optimal_temperature: f64,
    /// Deviation from the optimum at which the death rate saturates
    pub temperature_tolerance: f64,
    /// Upper bound on the per-tick death chance
    pub max_death_rate: f64,
    /// Divisor turning temperature into the colour-choice threshold
    pub color_temperature_scale: f64,
}

impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            growth_threshold: 0.1,
            optimal_temperature: 25.0,
            temperature_tolerance: 15.0,
            max_death_rate: 0.5,
            color_temperature_scale: 50.0,
        }
    }
}

impl ClimateParams {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("growth_threshold", self.growth_threshold),
            ("optimal_temperature", self.optimal_temperature),
            ("temperature_tolerance", self.temperature_tolerance),
            ("max_death_rate", self.max_death_rate),
            ("color_temperature_scale", self.color_temperature_scale),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidParameter(format!("{name} must be finite, got {value}")));
        }

        if !(0.0..=1.0).contains(&self.growth_threshold) {
            return Err(Error::InvalidParameter(format!(
                "growth_threshold must be within [0, 1], got {}",
                self.growth_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.max_death_rate) {
            return Err(Error::InvalidParameter(format!(
                "max_death_rate must be within [0, 1], got {}",
                self.max_death_rate
            )));
        }
        if self.temperature_tolerance <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "temperature_tolerance must be positive, got {}",
                self.temperature_tolerance
            )));
        }
        if self.color_temperature_scale <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "color_temperature_scale must be positive, got {}",
                self.color_temperature_scale
            )));
        }

        Ok(())
    }
}

/// A heating (positive) or cooling (negative) stimulus applied before a given tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureEvent {
    /// Zero-based index of the step the adjustment precedes
    pub at_tick: u64,
    pub delta: f64,
}

impl TemperatureEvent {
    pub fn heat(at_tick: u64) -> Self {
        Self { at_tick, delta: 1.0 }
    }

    pub fn cool(at_tick: u64) -> Self {
        Self { at_tick, delta: -1.0 }
    }
}

/// Driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Simulated time between steps (milliseconds)
    pub tick_interval_ms: u64,
    /// Wall-clock frame cadence feeding the tick accumulator (milliseconds)
    pub frame_interval_ms: u64,
    /// Pace steps in real time; when false, steps run back to back
    pub realtime: bool,
    /// CSV statistics log path
    pub stats_path: String,
    /// Keep existing rows in the statistics log instead of truncating it
    pub append: bool,
    /// Emit a population snapshot every N ticks
    pub log_every: u64,
    /// Optional JSON run summary path
    pub summary_path: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            frame_interval_ms: 16,
            realtime: true,
            stats_path: "world stats.csv".to_string(),
            append: false,
            log_every: 100,
            summary_path: None,
        }
    }
}

/// Complete run configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of ticks to run; `None` runs until interrupted
    pub num_ticks: Option<u64>,
    pub world: WorldConfig,
    pub climate: ClimateParams,
    pub runner: RunnerConfig,
    /// Scheduled heating and cooling events
    pub events: Vec<TemperatureEvent>,
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

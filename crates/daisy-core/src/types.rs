//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};

/// 2D position in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether the position lies inside a `width x height` world
    pub fn in_bounds(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < width && self.y < height
    }
}

/// State of a single grid cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Bare ground
    #[default]
    Barren,
    /// Black organism, absorbs heat
    Dark,
    /// White organism, reflects heat
    Light,
}

impl CellState {
    /// Heat this cell adds to the thermal sum each tick
    pub fn thermal_contribution(&self) -> i64 {
        match self {
            CellState::Barren => 0,
            CellState::Dark => 1,
            CellState::Light => -1,
        }
    }
}

/// Population statistics produced by one simulation step.
///
/// The engine hands one of these to its caller per tick and keeps no copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepStatistics {
    /// Number of steps completed, including the one that produced these values
    pub tick: u64,
    pub dark_count: u64,
    pub light_count: u64,
    pub barren_count: u64,
    /// Share of the world covered by dark organisms, 0 to 100
    pub dark_percent: f64,
    /// Share of the world covered by light organisms, 0 to 100
    pub light_percent: f64,
    /// World temperature after thermal feedback
    pub temperature: f64,
}

impl StepStatistics {
    pub fn from_counts(
        tick: u64,
        dark_count: u64,
        light_count: u64,
        barren_count: u64,
        temperature: f64,
    ) -> Self {
        let area = (dark_count + light_count + barren_count) as f64;
        let percent = |count: u64| {
            if area > 0.0 {
                (count * 100) as f64 / area
            } else {
                0.0
            }
        };

        Self {
            tick,
            dark_count,
            light_count,
            barren_count,
            dark_percent: percent(dark_count),
            light_percent: percent(light_count),
            temperature,
        }
    }

    pub fn area(&self) -> u64 {
        self.dark_count + self.light_count + self.barren_count
    }

    pub fn barren_percent(&self) -> f64 {
        let area = self.area();
        if area == 0 {
            return 0.0;
        }
        (self.barren_count * 100) as f64 / area as f64
    }

    /// Net heat from all organisms (dark minus light)
    pub fn thermal_sum(&self) -> i64 {
        self.dark_count as i64 - self.light_count as i64
    }
}

//! Simulation engine coupling the grid to the world temperature.

use crate::climate;
use crate::grid::Grid;
use daisy_core::{CellState, ClimateParams, Position, Result, StepStatistics, WorldConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument, trace};

/// Owns the grid, the temperature and the random stream.
///
/// A step is a pure function of those three plus the climate parameters, so
/// two engines built from the same seed and fed the same temperature
/// adjustments produce identical trajectories.
#[derive(Debug, Clone)]
pub struct Simulation {
    grid: Grid,
    temperature: f64,
    params: ClimateParams,
    rng: ChaCha8Rng,
    seed: u64,
    tick: u64,
}

impl Simulation {
    pub fn new(config: &WorldConfig, params: ClimateParams) -> Result<Self> {
        let grid = Grid::new(config.width, config.height)?;
        params.validate()?;

        info!(
            width = config.width,
            height = config.height,
            seed = config.seed,
            initial_temperature = config.initial_temperature,
            "World initialized"
        );

        Ok(Self {
            grid,
            temperature: config.initial_temperature,
            params,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            seed: config.seed,
            tick: 0,
        })
    }

    /// Build an all-barren world with the default climate parameters
    pub fn initialize(width: i32, height: i32, seed: u64, initial_temperature: f64) -> Result<Self> {
        let config = WorldConfig {
            width,
            height,
            seed,
            initial_temperature,
        };
        Self::new(&config, ClimateParams::default())
    }

    /// Advance the world by one tick.
    ///
    /// Population first, using the death rate and temperature from before the
    /// tick for every cell; thermal feedback second, over the updated grid.
    #[instrument(level = "trace", skip(self), fields(tick = self.tick))]
    pub fn step(&mut self) -> StepStatistics {
        let death_rate = self.death_rate();
        let temperature = self.temperature;

        for cell in self.grid.cells_mut() {
            *cell = climate::transition(*cell, death_rate, temperature, &self.params, &mut self.rng);
        }

        let (dark, light, barren) = self.grid.census();
        let thermal_sum = self.grid.thermal_sum();
        self.temperature += thermal_sum as f64 / self.grid.area() as f64;
        self.tick += 1;

        trace!(
            death_rate,
            dark,
            light,
            barren,
            thermal_sum,
            temperature = self.temperature,
            "Step complete"
        );

        StepStatistics::from_counts(self.tick, dark, light, barren, self.temperature)
    }

    /// Heat (positive) or cool (negative) the world; no bounds are applied
    pub fn adjust_temperature(&mut self, delta: f64) {
        self.temperature += delta;
        debug!(delta, temperature = self.temperature, tick = self.tick, "Temperature adjusted");
    }

    /// Cell at `(x, y)`, `None` outside the world
    pub fn cell(&self, x: i32, y: i32) -> Option<CellState> {
        self.grid.get(Position::new(x, y))
    }

    /// Iterator over every cell with its position, row by row
    pub fn cells(&self) -> impl Iterator<Item = (Position, CellState)> + '_ {
        self.grid.iter()
    }

    /// Counts for the current grid without advancing it
    pub fn statistics(&self) -> StepStatistics {
        let (dark, light, barren) = self.grid.census();
        StepStatistics::from_counts(self.tick, dark, light, barren, self.temperature)
    }

    /// Death rate the next step will apply
    pub fn death_rate(&self) -> f64 {
        climate::death_rate(self.temperature, &self.params)
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn width(&self) -> i32 {
        self.grid.width
    }

    pub fn height(&self) -> i32 {
        self.grid.height
    }

    pub fn area(&self) -> usize {
        self.grid.area()
    }

    /// Number of steps taken so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

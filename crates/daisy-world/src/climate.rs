//! Temperature-driven birth and death rules.
//!
//! Every rule here is a pure function of a cell's own state, the world
//! temperature at the start of the tick and the cell's own random draws.
//! That is what lets the engine update the grid in a single in-place pass
//! while still matching a fully synchronous update.

use daisy_core::{CellState, ClimateParams};
use rand::Rng;

/// Per-tick chance that an organism dies at the given temperature.
///
/// Linear ramp from 0 at the optimum to `max_death_rate` at
/// `temperature_tolerance` away from it, clamped above.
pub fn death_rate(temperature: f64, params: &ClimateParams) -> f64 {
    let deviation = (temperature - params.optimal_temperature).abs();
    let rate = params.max_death_rate * (deviation / params.temperature_tolerance);
    rate.min(params.max_death_rate)
}

/// Colour of a newly grown organism for the uniform draw `r`.
///
/// Dark only when `r` exceeds `temperature / color_temperature_scale`, so a
/// hotter world produces more light organisms.
pub fn choose_color(r: f64, temperature: f64, params: &ClimateParams) -> CellState {
    if r > temperature / params.color_temperature_scale {
        CellState::Dark
    } else {
        CellState::Light
    }
}

/// Next state of one cell.
///
/// Consumes one draw for the growth-or-death roll and one more only when a
/// barren cell sprouts.
pub fn transition<R: Rng + ?Sized>(
    state: CellState,
    death_rate: f64,
    temperature: f64,
    params: &ClimateParams,
    rng: &mut R,
) -> CellState {
    match state {
        CellState::Barren => {
            if rng.gen::<f64>() < params.growth_threshold {
                choose_color(rng.gen::<f64>(), temperature, params)
            } else {
                CellState::Barren
            }
        }
        organism => {
            if rng.gen::<f64>() < death_rate {
                CellState::Barren
            } else {
                organism
            }
        }
    }
}

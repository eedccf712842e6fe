//! Daisyworld simulation engine.
//!
//! A grid of barren ground, dark organisms and light organisms coupled to a
//! single world temperature: organisms grow and die depending on how far the
//! temperature is from their optimum, and their albedo feeds back into the
//! temperature every tick.

pub mod climate;
pub mod grid;
pub mod simulation;

pub use grid::Grid;
pub use simulation::Simulation;

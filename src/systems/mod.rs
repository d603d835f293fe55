//! Application systems
//!
//! Modular systems driving the game each frame.

mod menu;
mod simulation;

pub use menu::MainMenu;
pub use simulation::{SimulationResult, SimulationSystem};

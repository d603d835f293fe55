//! Game simulation system
//!
//! Runs one frame of the game loop:
//! - Delta time capping
//! - Input → character (variable rate)
//! - Scene loading and transitions
//! - Fixed-step physics, character and loading-screen updates

use log::trace;

use crate::game::{Game, GameError};

/// Longest frame the simulation will catch up on
const MAX_FRAME_DT: f32 = 0.25;

/// Result of a simulation update
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Fixed physics steps run this frame
    pub fixed_steps: u32,
    /// Scene transition progress after the frame
    pub transition_progress: f32,
}

/// Manages the game simulation loop
///
/// Variable-rate work runs once per frame; physics runs in fixed steps out
/// of an accumulator so results do not depend on frame rate.
pub struct SimulationSystem {
    fixed_timestep: f32,
    accumulator: f32,
}

impl SimulationSystem {
    /// Create a new simulation system with the given physics step
    pub fn new(fixed_timestep: f32) -> Self {
        Self {
            fixed_timestep: fixed_timestep.max(f32::EPSILON),
            accumulator: 0.0,
        }
    }

    pub fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep
    }

    /// Run one simulation frame of `dt` seconds
    pub fn update(&mut self, game: &mut Game, dt: f32) -> Result<SimulationResult, GameError> {
        // Cap dt to prevent spiral of death after a stall
        let dt = dt.clamp(0.0, MAX_FRAME_DT);

        game.update()?;
        game.advance_scenes();

        self.accumulator += dt;
        let mut fixed_steps = 0;
        while self.accumulator >= self.fixed_timestep {
            game.fixed_update(self.fixed_timestep)?;
            self.accumulator -= self.fixed_timestep;
            fixed_steps += 1;
        }
        trace!("Frame: {} fixed steps, {:.3}s carried", fixed_steps, self.accumulator);

        Ok(SimulationResult {
            fixed_steps,
            transition_progress: game.sequencer.progress(),
        })
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new(1.0 / 50.0)
    }
}

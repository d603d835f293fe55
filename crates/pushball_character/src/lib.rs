//! Side-scrolling character for Pushball
//!
//! - [`GroundSensor`] - Sphere overlap check below the character
//! - [`SlopeAnalyzer`] - Downward probe for surface angle and slope-aware push direction
//! - [`MovementIntegrator`] - Smoothed horizontal movement
//! - [`PushGrabController`] - Hold, release and push pushable bodies
//! - [`CharacterController`] - Composes the above around one rigid body
//!
//! All components talk to the physics world passed in by the caller; none
//! of them own it.

mod controller;
mod ground;
mod movement;
mod push_grab;
mod slope;

pub use controller::{CharacterConfig, CharacterController, CharacterState, ControllerError};
pub use ground::GroundSensor;
pub use movement::{MovementIntegrator, DEFAULT_DAMPING_RATE};
pub use push_grab::{GrabState, PushGrabController, DEFAULT_MAX_PUSH_FORCE, DEFAULT_PUSH_DISTANCE};
pub use slope::{SlopeAnalyzer, SlopeProbe, DEFAULT_MAX_SLOPE_ANGLE};

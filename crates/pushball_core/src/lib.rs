//! Scene management for the Pushball platformer
//!
//! - [`Scene`] - Loadable scene template (geometry, bodies, triggers)
//! - [`ActiveScene`] - A loaded scene with its own physics world
//! - [`SceneManager`] - Registers templates, loads and unloads scenes over several frames
//! - [`SceneBackend`] - Scene operations as seen by gameplay code
//! - [`SceneTransitionSequencer`] - Moves between scenes through a loading scene
//! - [`TransitionProgressDisplay`] - Loading-screen progress bar

mod scene;
mod scene_loader;
mod scene_manager;
mod scene_transition;
mod progress;

pub use scene::{ActiveScene, Scene, SceneError};
pub use scene_loader::{SceneBackend, SceneOp, SceneOpKey, SceneOpKind, SceneOps};
pub use scene_manager::SceneManager;
pub use scene_transition::{
    SceneLoadJob, SceneTransitionSequencer, TransitionError, TransitionState,
    PROGRESS_TARGET_ACTIVATED, PROGRESS_TRANSITION_LOADED,
};
pub use progress::TransitionProgressDisplay;

// Re-export physics types for convenient access through pushball_core
pub use pushball_physics::{BodyKey, PhysicsConfig, PhysicsWorld, RigidBody, StaticCollider};

//! Main menu flow
//!
//! The menu has a single start button that hands the first level to the
//! transition sequencer.

use log::info;
use pushball_core::{SceneBackend, SceneTransitionSequencer, TransitionError};

/// Main menu start button
pub struct MainMenu {
    next_scene: String,
}

impl MainMenu {
    /// Create a menu whose start button loads `next_scene`
    pub fn new(next_scene: impl Into<String>) -> Self {
        Self {
            next_scene: next_scene.into(),
        }
    }

    pub fn next_scene(&self) -> &str {
        &self.next_scene
    }

    /// Press the start button
    pub fn press_start<B: SceneBackend>(
        &self,
        sequencer: &mut SceneTransitionSequencer,
        backend: &mut B,
    ) -> Result<(), TransitionError> {
        info!("Start pressed, loading '{}'", self.next_scene);
        sequencer.request_load(backend, &self.next_scene)
    }
}

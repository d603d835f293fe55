//! Loading-screen progress display
//!
//! The transition scene shows a progress bar bound to the sequencer. The
//! bar only mirrors progress between the moment the transition scene has
//! loaded and the moment progress reaches 1.0. A transition abandoned before
//! completion stops the bar when its transition scene is unloaded.

/// Progress bar state for the transition scene
#[derive(Clone, Debug)]
pub struct TransitionProgressDisplay {
    transition_scene: String,
    enabled: bool,
    value: f32,
}

impl TransitionProgressDisplay {
    pub fn new(transition_scene: impl Into<String>) -> Self {
        Self {
            transition_scene: transition_scene.into(),
            enabled: false,
            value: 0.0,
        }
    }

    /// Feed a scene-loaded notification; enables updates for the transition scene
    pub fn on_scene_loaded(&mut self, scene: &str) {
        if scene == self.transition_scene {
            self.enabled = true;
        }
    }

    /// Feed a scene-unloaded notification for an abandoned transition
    pub fn on_scene_unloaded(&mut self, scene: &str) {
        if scene == self.transition_scene {
            self.enabled = false;
        }
    }

    /// Poll the sequencer's progress once per fixed tick
    pub fn fixed_update(&mut self, progress: f32) {
        if self.enabled {
            self.value = progress;
        }
        if progress >= 1.0 {
            self.enabled = false;
        }
    }

    /// Value shown on the bar
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignores_progress_before_scene_loaded() {
        let mut display = TransitionProgressDisplay::new("Loading");
        display.fixed_update(0.5);
        assert_eq!(display.value(), 0.0);
        assert!(!display.is_enabled());
    }

    #[test]
    fn test_ignores_other_scenes() {
        let mut display = TransitionProgressDisplay::new("Loading");
        display.on_scene_loaded("Level1");
        assert!(!display.is_enabled());
    }

    #[test]
    fn test_mirrors_progress_until_complete() {
        let mut display = TransitionProgressDisplay::new("Loading");
        display.on_scene_loaded("Loading");

        display.fixed_update(0.1);
        assert_eq!(display.value(), 0.1);
        display.fixed_update(0.5);
        assert_eq!(display.value(), 0.5);

        display.fixed_update(1.0);
        assert_eq!(display.value(), 1.0);
        assert!(!display.is_enabled());

        // Stale reads after completion are ignored
        display.fixed_update(0.0);
        assert_eq!(display.value(), 1.0);
    }

    #[test]
    fn test_stops_when_transition_scene_unloaded() {
        let mut display = TransitionProgressDisplay::new("Loading");
        display.on_scene_loaded("Loading");
        display.fixed_update(0.1);

        display.on_scene_unloaded("MainMenu");
        assert!(display.is_enabled());

        display.on_scene_unloaded("Loading");
        assert!(!display.is_enabled());
        display.fixed_update(0.4);
        assert_eq!(display.value(), 0.1);
    }
}

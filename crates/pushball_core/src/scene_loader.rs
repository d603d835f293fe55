//! Multi-frame scene loading
//!
//! Scene loads and unloads do not finish in the frame they are requested.
//! Each request becomes a [`SceneOp`] tracked under a [`SceneOpKey`];
//! callers poll it across frames until it reports done.
//!
//! [`SceneBackend`] is the seam between gameplay code (the transition
//! sequencer) and whatever owns the scenes. [`SceneManager`](crate::SceneManager)
//! is the in-process implementation.

use slotmap::{new_key_type, SlotMap};

use crate::scene::SceneError;

new_key_type! {
    /// Handle to one in-flight scene load or unload
    pub struct SceneOpKey;
}

/// What a scene operation does
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneOpKind {
    /// Additive load; activation may be deferred
    Load { scene: String },
    Unload { scene: String },
}

/// Bookkeeping for one scene operation
#[derive(Clone, Debug)]
pub struct SceneOp {
    pub kind: SceneOpKind,
    steps_total: u32,
    steps_done: u32,
    allow_activation: bool,
    done: bool,
    /// The requester no longer polls this op; drop it once done
    released: bool,
}

impl SceneOp {
    fn new(kind: SceneOpKind, steps_total: u32, allow_activation: bool) -> Self {
        Self {
            kind,
            steps_total,
            steps_done: 0,
            allow_activation,
            done: false,
            released: false,
        }
    }

    /// Fraction of the work completed, in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.steps_total == 0 {
            1.0
        } else {
            self.steps_done as f32 / self.steps_total as f32
        }
    }

    /// All work is done; a deferred load still waits for activation
    pub fn is_ready(&self) -> bool {
        self.steps_done >= self.steps_total
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Pending scene operations
#[derive(Default)]
pub struct SceneOps {
    ops: SlotMap<SceneOpKey, SceneOp>,
}

impl SceneOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_load(&mut self, scene: &str, steps: u32, allow_activation: bool) -> SceneOpKey {
        self.ops.insert(SceneOp::new(
            SceneOpKind::Load { scene: scene.to_string() },
            steps,
            allow_activation,
        ))
    }

    pub fn start_unload(&mut self, scene: &str, steps: u32) -> SceneOpKey {
        self.ops.insert(SceneOp::new(
            SceneOpKind::Unload { scene: scene.to_string() },
            steps,
            true,
        ))
    }

    pub fn get(&self, key: SceneOpKey) -> Result<&SceneOp, SceneError> {
        self.ops.get(key).ok_or(SceneError::UnknownOperation)
    }

    pub fn allow_activation(&mut self, key: SceneOpKey) -> Result<(), SceneError> {
        let op = self.ops.get_mut(key).ok_or(SceneError::UnknownOperation)?;
        op.allow_activation = true;
        Ok(())
    }

    /// Drop an unfinished operation
    pub fn abort(&mut self, key: SceneOpKey) -> Result<SceneOp, SceneError> {
        self.ops.remove(key).ok_or(SceneError::UnknownOperation)
    }

    /// Stop tracking an operation; it keeps running if unfinished
    pub fn release(&mut self, key: SceneOpKey) {
        match self.ops.get(key).map(|op| op.done) {
            Some(true) => {
                self.ops.remove(key);
            }
            Some(false) => {
                if let Some(op) = self.ops.get_mut(key) {
                    op.released = true;
                }
            }
            None => {}
        }
    }

    /// Whether an unfinished load for `scene` is in flight
    pub fn is_loading(&self, scene: &str) -> bool {
        self.ops.values().any(|op| {
            !op.done && matches!(&op.kind, SceneOpKind::Load { scene: s } if s == scene)
        })
    }

    /// Advance every unfinished op by one frame
    ///
    /// Returns the ops that completed this frame; the caller applies them
    /// (instantiates or removes scenes).
    pub fn advance(&mut self) -> Vec<SceneOpKind> {
        let mut completed = Vec::new();

        for op in self.ops.values_mut() {
            if op.done {
                continue;
            }
            if op.steps_done < op.steps_total {
                op.steps_done += 1;
            }
            if op.is_ready() && op.allow_activation {
                op.done = true;
                completed.push(op.kind.clone());
            }
        }

        self.ops.retain(|_, op| !(op.done && op.released));
        completed
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Scene-management collaborator used by the transition sequencer
pub trait SceneBackend {
    /// Whether a template with this name can be loaded
    fn has_scene(&self, name: &str) -> bool;

    /// Whether this scene is currently loaded
    fn is_loaded(&self, name: &str) -> bool;

    /// Begin an additive load
    ///
    /// With `allow_activation == false` the load stops once ready until
    /// [`allow_activation`](SceneBackend::allow_activation) is called.
    fn load_scene_additive(&mut self, name: &str, allow_activation: bool) -> Result<SceneOpKey, SceneError>;

    /// Begin unloading a loaded scene
    fn unload_scene(&mut self, name: &str) -> Result<SceneOpKey, SceneError>;

    /// Load progress in [0, 1]
    fn progress(&self, op: SceneOpKey) -> Result<f32, SceneError>;

    fn is_done(&self, op: SceneOpKey) -> Result<bool, SceneError>;

    fn allow_activation(&mut self, op: SceneOpKey) -> Result<(), SceneError>;

    /// Abandon an unfinished operation
    fn abort(&mut self, op: SceneOpKey) -> Result<(), SceneError>;

    /// Stop tracking an operation handle
    fn release(&mut self, op: SceneOpKey);

    fn set_active_scene(&mut self, name: &str) -> Result<(), SceneError>;

    fn active_scene_name(&self) -> Option<&str>;

    /// Drain the names of scenes that finished loading since the last call
    fn take_loaded_events(&mut self) -> Vec<String>;

    /// Drain the names of scenes removed since the last call
    fn take_unloaded_events(&mut self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_progresses_one_step_per_frame() {
        let mut ops = SceneOps::new();
        let key = ops.start_load("Level1", 4, true);

        assert_eq!(ops.get(key).unwrap().progress(), 0.0);
        ops.advance();
        assert!((ops.get(key).unwrap().progress() - 0.25).abs() < 0.0001);
        ops.advance();
        ops.advance();
        assert!(!ops.get(key).unwrap().is_done());

        let completed = ops.advance();
        assert!(ops.get(key).unwrap().is_done());
        assert_eq!(completed, vec![SceneOpKind::Load { scene: "Level1".to_string() }]);
    }

    #[test]
    fn test_deferred_load_waits_for_activation() {
        let mut ops = SceneOps::new();
        let key = ops.start_load("Level1", 1, false);

        ops.advance();
        let op = ops.get(key).unwrap();
        assert!(op.is_ready());
        assert!(!op.is_done());

        // Ready loads stay parked
        assert!(ops.advance().is_empty());

        ops.allow_activation(key).unwrap();
        assert_eq!(ops.advance().len(), 1);
        assert!(ops.get(key).unwrap().is_done());
    }

    #[test]
    fn test_zero_step_load_is_ready_immediately() {
        let mut ops = SceneOps::new();
        let key = ops.start_load("Menu", 0, true);
        assert_eq!(ops.get(key).unwrap().progress(), 1.0);
        assert_eq!(ops.advance().len(), 1);
    }

    #[test]
    fn test_released_op_is_pruned_when_done() {
        let mut ops = SceneOps::new();
        let key = ops.start_unload("Loading", 2);
        ops.release(key);
        assert_eq!(ops.len(), 1);

        ops.advance();
        assert_eq!(ops.len(), 1);
        ops.advance();
        assert!(ops.is_empty());
        assert_eq!(ops.get(key).unwrap_err(), SceneError::UnknownOperation);
    }

    #[test]
    fn test_is_loading_tracks_unfinished_loads() {
        let mut ops = SceneOps::new();
        let key = ops.start_load("Level1", 1, true);
        assert!(ops.is_loading("Level1"));
        assert!(!ops.is_loading("Level2"));
        ops.advance();
        assert!(!ops.is_loading("Level1"));
        ops.release(key);
        assert!(ops.is_empty());
    }

    #[test]
    fn test_abort_unknown_op() {
        let mut ops = SceneOps::new();
        let key = ops.start_load("Level1", 1, true);
        assert!(ops.abort(key).is_ok());
        assert!(ops.abort(key).is_err());
    }
}

//! Scene management with additive loading
//!
//! The SceneManager owns every scene template and every loaded scene:
//! - Register scene templates
//! - Load scenes additively over several frames (activation can be deferred)
//! - Unload scenes over several frames
//! - Track which loaded scene is active
//!
//! # Example
//! ```ignore
//! let mut manager = SceneManager::new().with_physics(PhysicsConfig::new(-9.81));
//! manager.register_template(Scene::new("MainMenu"));
//! manager.register_template(Scene::new("Level1").with_load_steps(30));
//! manager.load_immediate("MainMenu")?;
//!
//! let op = manager.load_scene_additive("Level1", true)?;
//! while !manager.is_done(op)? {
//!     manager.advance_operations();
//! }
//! ```

use std::collections::HashMap;

use log::{debug, info};
use pushball_physics::PhysicsConfig;

use crate::scene::{ActiveScene, Scene, SceneError};
use crate::scene_loader::{SceneBackend, SceneOpKey, SceneOpKind, SceneOps};

/// Frames an unload takes
const UNLOAD_STEPS: u32 = 1;

/// Owns scene templates, loaded scenes, and in-flight scene operations
pub struct SceneManager {
    templates: HashMap<String, Scene>,
    scenes: HashMap<String, ActiveScene>,
    /// Loaded scene names in load order
    load_order: Vec<String>,
    active: Option<String>,
    ops: SceneOps,
    loaded_events: Vec<String>,
    unloaded_events: Vec<String>,
    default_physics: Option<PhysicsConfig>,
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneManager {
    /// Create a new empty scene manager
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
            scenes: HashMap::new(),
            load_order: Vec::new(),
            active: None,
            ops: SceneOps::new(),
            loaded_events: Vec::new(),
            unloaded_events: Vec::new(),
            default_physics: None,
        }
    }

    /// Set the default physics config for new scenes
    pub fn with_physics(mut self, config: PhysicsConfig) -> Self {
        self.default_physics = Some(config);
        self
    }

    // --- Templates ---

    pub fn register_template(&mut self, template: Scene) {
        self.templates.insert(template.name.clone(), template);
    }

    // --- Loaded scenes ---

    /// Load a scene synchronously and make it active (startup scene)
    pub fn load_immediate(&mut self, name: &str) -> Result<(), SceneError> {
        if self.scenes.contains_key(name) {
            return Err(SceneError::AlreadyLoaded(name.to_string()));
        }
        self.instantiate(name)?;
        self.active = Some(name.to_string());
        Ok(())
    }

    fn instantiate(&mut self, name: &str) -> Result<(), SceneError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| SceneError::NotRegistered(name.to_string()))?;
        let scene = ActiveScene::from_template(template, self.default_physics.clone());
        self.scenes.insert(name.to_string(), scene);
        self.load_order.push(name.to_string());
        self.loaded_events.push(name.to_string());
        info!("Scene '{}' loaded", name);
        Ok(())
    }

    fn remove(&mut self, name: &str) {
        if self.scenes.remove(name).is_none() {
            return;
        }
        self.load_order.retain(|n| n != name);
        if self.active.as_deref() == Some(name) {
            // Fall back to the oldest remaining scene
            self.active = self.load_order.first().cloned();
        }
        self.unloaded_events.push(name.to_string());
        info!("Scene '{}' unloaded", name);
    }

    pub fn get_scene(&self, name: &str) -> Option<&ActiveScene> {
        self.scenes.get(name)
    }

    pub fn get_scene_mut(&mut self, name: &str) -> Option<&mut ActiveScene> {
        self.scenes.get_mut(name)
    }

    pub fn active_scene(&self) -> Option<&ActiveScene> {
        self.active.as_ref().and_then(|name| self.scenes.get(name))
    }

    pub fn active_scene_mut(&mut self) -> Option<&mut ActiveScene> {
        match self.active.clone() {
            Some(name) => self.scenes.get_mut(&name),
            None => None,
        }
    }

    /// Loaded scene names in load order
    pub fn loaded_scenes(&self) -> &[String] {
        &self.load_order
    }

    /// Number of scene operations still tracked
    pub fn pending_operations(&self) -> usize {
        self.ops.len()
    }

    // --- Frame update ---

    /// Advance in-flight loads and unloads by one frame
    pub fn advance_operations(&mut self) {
        for kind in self.ops.advance() {
            match kind {
                SceneOpKind::Load { scene } => {
                    if let Err(e) = self.instantiate(&scene) {
                        log::warn!("Failed to activate scene '{}': {}", scene, e);
                    }
                }
                SceneOpKind::Unload { scene } => self.remove(&scene),
            }
        }
    }

    /// Step the active scene's physics
    pub fn update(&mut self, dt: f32) {
        if let Some(scene) = self.active_scene_mut() {
            scene.update(dt);
        }
    }
}

impl SceneBackend for SceneManager {
    fn has_scene(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    fn is_loaded(&self, name: &str) -> bool {
        self.scenes.contains_key(name)
    }

    fn load_scene_additive(&mut self, name: &str, allow_activation: bool) -> Result<SceneOpKey, SceneError> {
        let steps = self
            .templates
            .get(name)
            .map(|t| t.load_steps)
            .ok_or_else(|| SceneError::NotRegistered(name.to_string()))?;
        if self.scenes.contains_key(name) || self.ops.is_loading(name) {
            return Err(SceneError::AlreadyLoaded(name.to_string()));
        }
        debug!("Loading scene '{}' additively (activation allowed: {})", name, allow_activation);
        Ok(self.ops.start_load(name, steps, allow_activation))
    }

    fn unload_scene(&mut self, name: &str) -> Result<SceneOpKey, SceneError> {
        if !self.scenes.contains_key(name) {
            return Err(SceneError::NotLoaded(name.to_string()));
        }
        debug!("Unloading scene '{}'", name);
        Ok(self.ops.start_unload(name, UNLOAD_STEPS))
    }

    fn progress(&self, op: SceneOpKey) -> Result<f32, SceneError> {
        self.ops.get(op).map(|op| op.progress())
    }

    fn is_done(&self, op: SceneOpKey) -> Result<bool, SceneError> {
        self.ops.get(op).map(|op| op.is_done())
    }

    fn allow_activation(&mut self, op: SceneOpKey) -> Result<(), SceneError> {
        self.ops.allow_activation(op)
    }

    fn abort(&mut self, op: SceneOpKey) -> Result<(), SceneError> {
        let aborted = self.ops.abort(op)?;
        debug!("Aborted scene operation {:?}", aborted.kind);
        Ok(())
    }

    fn release(&mut self, op: SceneOpKey) {
        self.ops.release(op);
    }

    fn set_active_scene(&mut self, name: &str) -> Result<(), SceneError> {
        if !self.scenes.contains_key(name) {
            return Err(SceneError::NotLoaded(name.to_string()));
        }
        self.active = Some(name.to_string());
        info!("Active scene is now '{}'", name);
        Ok(())
    }

    fn active_scene_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    fn take_loaded_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.loaded_events)
    }

    fn take_unloaded_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.unloaded_events)
    }
}

//! Scene templates and runtime scenes
//!
//! A [`Scene`] is a template: a named recipe of level geometry, bodies and
//! trigger zones. Loading a scene instantiates it into an [`ActiveScene`]
//! owning its own [`PhysicsWorld`].

use std::collections::HashMap;

use pushball_math::Vec3;
use pushball_physics::{
    BodyKey, PhysicsConfig, PhysicsWorld, RigidBody, StaticCollider, TriggerVolume,
};

/// Loadable scene template
#[derive(Clone, Debug)]
pub struct Scene {
    /// Scene name (unique key in the scene manager)
    pub name: String,
    /// Gravity override for this scene's physics
    pub gravity: Option<f32>,
    /// Number of frames an additive load of this scene takes
    pub load_steps: u32,
    /// Player spawn position
    pub player_spawn: Option<[f32; 3]>,
    /// Level geometry
    pub static_colliders: Vec<StaticCollider>,
    /// Named dynamic bodies
    pub bodies: Vec<(String, RigidBody)>,
    /// Trigger zones
    pub triggers: Vec<TriggerVolume>,
}

impl Scene {
    /// Create an empty scene template
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gravity: None,
            load_steps: 1,
            player_spawn: None,
            static_colliders: Vec::new(),
            bodies: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = Some(gravity);
        self
    }

    pub fn with_load_steps(mut self, steps: u32) -> Self {
        self.load_steps = steps;
        self
    }

    pub fn with_player_spawn(mut self, x: f32, y: f32, z: f32) -> Self {
        self.player_spawn = Some([x, y, z]);
        self
    }

    pub fn with_static_collider(mut self, collider: StaticCollider) -> Self {
        self.static_colliders.push(collider);
        self
    }

    pub fn with_body(mut self, name: impl Into<String>, body: RigidBody) -> Self {
        self.bodies.push((name.into(), body));
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerVolume) -> Self {
        self.triggers.push(trigger);
        self
    }
}

/// Errors from scene management
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// No template is registered under this name
    NotRegistered(String),
    /// The scene is not currently loaded
    NotLoaded(String),
    /// The scene is already loaded or a load is in flight
    AlreadyLoaded(String),
    /// The operation handle is stale or was never issued
    UnknownOperation,
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::NotRegistered(name) => write!(f, "Scene not registered: {}", name),
            SceneError::NotLoaded(name) => write!(f, "Scene not loaded: {}", name),
            SceneError::AlreadyLoaded(name) => write!(f, "Scene already loaded: {}", name),
            SceneError::UnknownOperation => write!(f, "Unknown scene operation"),
        }
    }
}

impl std::error::Error for SceneError {}

/// A runtime scene with its own physics world
pub struct ActiveScene {
    /// Scene name
    pub name: String,
    /// Player spawn position (from template)
    pub player_spawn: Option<[f32; 3]>,
    /// The live physics world
    pub physics: PhysicsWorld,
    named_bodies: HashMap<String, BodyKey>,
}

impl ActiveScene {
    /// Create an empty runtime scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            player_spawn: None,
            physics: PhysicsWorld::new(),
            named_bodies: HashMap::new(),
        }
    }

    /// Instantiate a runtime scene from a template
    ///
    /// The template's gravity wins over `default_physics`.
    pub fn from_template(template: &Scene, default_physics: Option<PhysicsConfig>) -> Self {
        let config = match (template.gravity, default_physics) {
            (Some(gravity), _) => PhysicsConfig::new(gravity),
            (None, Some(config)) => config,
            (None, None) => PhysicsConfig::default(),
        };

        let mut physics = PhysicsWorld::with_config(config);
        for collider in &template.static_colliders {
            physics.add_static_collider(collider.clone());
        }
        for trigger in &template.triggers {
            physics.add_trigger(trigger.clone());
        }

        let mut named_bodies = HashMap::new();
        for (name, body) in &template.bodies {
            let key = physics.add_body(body.clone());
            named_bodies.insert(name.clone(), key);
        }

        Self {
            name: template.name.clone(),
            player_spawn: template.player_spawn,
            physics,
            named_bodies,
        }
    }

    /// Look up a template body by name
    pub fn body(&self, name: &str) -> Option<BodyKey> {
        self.named_bodies.get(name).copied()
    }

    /// Player spawn as a vector
    pub fn spawn_point(&self) -> Option<Vec3> {
        self.player_spawn.map(Vec3::from)
    }

    /// Step this scene's physics
    pub fn update(&mut self, dt: f32) {
        self.physics.step(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushball_physics::PhysicsMaterial;

    #[test]
    fn test_scene_error_display() {
        let err = SceneError::NotLoaded("Level1".to_string());
        assert_eq!(format!("{}", err), "Scene not loaded: Level1");
        assert_eq!(format!("{}", SceneError::UnknownOperation), "Unknown scene operation");
    }

    #[test]
    fn test_from_template_instantiates_bodies() {
        let template = Scene::new("Level1")
            .with_gravity(-12.0)
            .with_player_spawn(1.0, 2.0, 0.0)
            .with_static_collider(StaticCollider::floor(0.0, PhysicsMaterial::CONCRETE))
            .with_body("ball", RigidBody::new_sphere(Vec3::new(3.0, 1.0, 0.0), 0.5));

        let scene = ActiveScene::from_template(&template, Some(PhysicsConfig::new(-1.0)));
        assert_eq!(scene.name, "Level1");
        assert_eq!(scene.physics.config.gravity, -12.0);
        assert_eq!(scene.physics.body_count(), 1);
        assert_eq!(scene.physics.static_colliders().len(), 1);
        assert_eq!(scene.spawn_point(), Some(Vec3::new(1.0, 2.0, 0.0)));

        let ball = scene.body("ball").unwrap();
        assert!(scene.physics.get_body(ball).is_some());
        assert!(scene.body("missing").is_none());
    }

    #[test]
    fn test_from_template_falls_back_to_default_physics() {
        let scene = ActiveScene::from_template(&Scene::new("Menu"), Some(PhysicsConfig::new(-3.0)));
        assert_eq!(scene.physics.config.gravity, -3.0);
    }
}

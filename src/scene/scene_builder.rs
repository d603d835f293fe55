//! SceneBuilder - Declarative scene construction
//!
//! Provides a fluent API for building side-scrolling level templates.

use pushball_core::Scene;
use pushball_math::Vec3;
use pushball_physics::{
    Collider, CollisionFilter, PhysicsMaterial, Plane, RigidBody, StaticCollider, TriggerVolume,
};

/// Builder for constructing scene templates
///
/// # Example
/// ```ignore
/// let level = SceneBuilder::new("Level1")
///     .with_load_steps(30)
///     .add_floor(0.0, PhysicsMaterial::CONCRETE)
///     .add_player(Vec3::new(0.0, 0.5, 0.0))
///     .add_ball("ball", Vec3::new(3.0, 0.5, 0.0), 0.5)
///     .build();
/// ```
pub struct SceneBuilder {
    scene: Scene,
}

impl SceneBuilder {
    /// Create a new scene builder
    pub fn new(name: &str) -> Self {
        Self {
            scene: Scene::new(name),
        }
    }

    /// Override gravity for this scene (negative = downward)
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.scene = self.scene.with_gravity(gravity);
        self
    }

    /// Number of frames an additive load of this scene takes
    pub fn with_load_steps(mut self, steps: u32) -> Self {
        self.scene = self.scene.with_load_steps(steps);
        self
    }

    /// Add a floor at the given Y position
    pub fn add_floor(mut self, y: f32, material: PhysicsMaterial) -> Self {
        self.scene = self.scene.with_static_collider(StaticCollider::floor(y, material));
        self
    }

    /// Add a box platform
    pub fn add_platform(mut self, center: Vec3, half_extents: Vec3, material: PhysicsMaterial) -> Self {
        self.scene = self
            .scene
            .with_static_collider(StaticCollider::platform(center, half_extents, material));
        self
    }

    /// Add a slope through `point` rising at `angle_deg` toward +X
    pub fn add_slope(mut self, point: Vec3, angle_deg: f32, material: PhysicsMaterial) -> Self {
        self.scene = self.scene.with_static_collider(StaticCollider::new(
            Collider::Plane(Plane::slope(point, angle_deg)),
            material,
        ));
        self
    }

    /// Set the player spawn point
    pub fn add_player(mut self, position: Vec3) -> Self {
        self.scene = self.scene.with_player_spawn(position.x, position.y, position.z);
        self
    }

    /// Add a named pushable ball
    pub fn add_ball(mut self, name: &str, position: Vec3, radius: f32) -> Self {
        self.scene = self.scene.with_body(
            name,
            RigidBody::new_sphere(position, radius)
                .with_filter(CollisionFilter::pushable())
                .with_material(PhysicsMaterial::RUBBER),
        );
        self
    }

    /// Add a named body
    pub fn add_body(mut self, name: &str, body: RigidBody) -> Self {
        self.scene = self.scene.with_body(name, body);
        self
    }

    /// Add a zone where the player cannot grab
    pub fn add_push_exclusion(mut self, center: Vec3, half_extents: Vec3) -> Self {
        self.scene = self
            .scene
            .with_trigger(TriggerVolume::push_exclusion(center, half_extents));
        self
    }

    /// Build and return the scene template
    pub fn build(self) -> Scene {
        self.scene
    }

    /// Get the player spawn position (if set)
    pub fn player_start(&self) -> Option<Vec3> {
        self.scene.player_spawn.map(Vec3::from)
    }
}

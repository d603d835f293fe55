//! Ground detection

use pushball_math::Vec3;
use pushball_physics::{CollisionLayer, PhysicsWorld};

/// Sphere overlap check below the character
#[derive(Clone, Copy, Debug)]
pub struct GroundSensor {
    /// Offset of the check sphere from the character origin
    pub offset: Vec3,
    pub radius: f32,
    /// Layers that count as ground
    pub mask: CollisionLayer,
}

impl GroundSensor {
    pub fn new(offset: Vec3, radius: f32) -> Self {
        Self {
            offset,
            radius,
            mask: CollisionLayer::GROUND,
        }
    }

    pub fn with_mask(mut self, mask: CollisionLayer) -> Self {
        self.mask = mask;
        self
    }

    /// Whether anything on the ground mask overlaps the check sphere
    pub fn is_grounded(&self, world: &PhysicsWorld, origin: Vec3) -> bool {
        world.overlap_sphere(origin + self.offset, self.radius, self.mask)
    }
}

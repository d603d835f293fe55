//! Rigid bodies, static colliders, and trigger volumes

use bitflags::bitflags;
use pushball_math::Vec3;
use slotmap::new_key_type;

use crate::collision::{CollisionFilter, CollisionLayer};
use crate::material::PhysicsMaterial;
use crate::shapes::{Aabb, Collider, Plane, Sphere};

new_key_type! {
    /// Key to a rigid body in the physics world
    ///
    /// Generational: once a body is removed, old keys resolve to `None`
    /// even if the slot is reused. Holding a key never keeps a body alive.
    pub struct BodyKey;
}

bitflags! {
    /// Per-axis motion locks applied during integration and impulses
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Constraints: u8 {
        const FREEZE_POSITION_X = 1 << 0;
        const FREEZE_POSITION_Y = 1 << 1;
        const FREEZE_POSITION_Z = 1 << 2;
        const FREEZE_POSITION = Self::FREEZE_POSITION_X.bits()
            | Self::FREEZE_POSITION_Y.bits()
            | Self::FREEZE_POSITION_Z.bits();
    }
}

impl Constraints {
    /// Zero the components of `v` on frozen axes
    pub fn mask(self, v: Vec3) -> Vec3 {
        Vec3::new(
            if self.contains(Self::FREEZE_POSITION_X) { 0.0 } else { v.x },
            if self.contains(Self::FREEZE_POSITION_Y) { 0.0 } else { v.y },
            if self.contains(Self::FREEZE_POSITION_Z) { 0.0 } else { v.z },
        )
    }
}

/// A rigid body with position, velocity, and collision shape
#[derive(Clone, Debug)]
pub struct RigidBody {
    /// Position in world coordinates
    pub position: Vec3,
    /// Velocity (units per second)
    pub velocity: Vec3,
    /// Mass (used for impulses and push resolution)
    pub mass: f32,
    /// Whether this body is affected by gravity
    pub affected_by_gravity: bool,
    /// The collision shape (stores absolute world position)
    pub collider: Collider,
    /// Static bodies never move
    pub is_static: bool,
    /// Surface material
    pub material: PhysicsMaterial,
    /// Layer membership and collision mask
    pub filter: CollisionFilter,
    /// Axis locks
    pub constraints: Constraints,
}

impl RigidBody {
    /// Create a new rigid body with a sphere collider
    pub fn new_sphere(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            mass: 1.0,
            affected_by_gravity: true,
            collider: Collider::Sphere(Sphere::new(position, radius)),
            is_static: false,
            material: PhysicsMaterial::default(),
            filter: CollisionFilter::default(),
            constraints: Constraints::FREEZE_POSITION_Z,
        }
    }

    /// Create a new rigid body with an AABB collider
    pub fn new_aabb(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            collider: Collider::Aabb(Aabb::from_center_half_extents(position, half_extents)),
            ..Self::new_sphere(position, 0.0)
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass.max(f32::EPSILON);
        self
    }

    pub fn with_gravity(mut self, affected: bool) -> Self {
        self.affected_by_gravity = affected;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        if is_static {
            self.affected_by_gravity = false;
        }
        self
    }

    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Update the position and sync the collider
    pub fn set_position(&mut self, position: Vec3) {
        let delta = position - self.position;
        self.position = position;
        self.collider = self.collider.translated(delta);
    }

    /// Apply a positional correction, honouring axis locks
    pub fn apply_correction(&mut self, correction: Vec3) {
        let correction = self.constraints.mask(correction);
        self.position += correction;
        self.collider = self.collider.translated(correction);
    }

    /// Apply an instantaneous velocity change (`dv = impulse / mass`)
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        if self.is_static {
            return;
        }
        self.velocity += self.constraints.mask(impulse / self.mass);
    }
}

/// Immovable level geometry
#[derive(Clone, Debug)]
pub struct StaticCollider {
    pub collider: Collider,
    pub material: PhysicsMaterial,
    pub filter: CollisionFilter,
}

impl StaticCollider {
    /// Create a static collider on the ground layer
    pub fn new(collider: Collider, material: PhysicsMaterial) -> Self {
        Self {
            collider,
            material,
            filter: CollisionFilter::ground(),
        }
    }

    /// Infinite horizontal floor at the given height
    pub fn floor(y: f32, material: PhysicsMaterial) -> Self {
        Self::new(Collider::Plane(Plane::floor(y)), material)
    }

    /// Axis-aligned platform
    pub fn platform(center: Vec3, half_extents: Vec3, material: PhysicsMaterial) -> Self {
        Self::new(
            Collider::Aabb(Aabb::from_center_half_extents(center, half_extents)),
            material,
        )
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// A non-solid volume that is only ever queried, never resolved
#[derive(Clone, Debug)]
pub struct TriggerVolume {
    pub collider: Collider,
    pub layer: CollisionLayer,
}

impl TriggerVolume {
    pub fn new(collider: Collider, layer: CollisionLayer) -> Self {
        Self { collider, layer }
    }

    /// Box-shaped zone in which grabbing is disallowed
    pub fn push_exclusion(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(
            Collider::Aabb(Aabb::from_center_half_extents(center, half_extents)),
            CollisionLayer::PUSH_EXCLUSION,
        )
    }
}

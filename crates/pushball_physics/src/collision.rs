//! Collision detection and ray queries
//!
//! Provides overlap tests between spheres, AABBs, and planes, ray casts
//! against the same primitives, and collision filtering via layer masks.

use bitflags::bitflags;

use crate::shapes::{Aabb, Collider, Plane, Ray, Sphere};
use pushball_math::Vec3;

bitflags! {
    /// Collision layers for filtering which objects interact
    ///
    /// Each layer is a bit in a 32-bit mask. Queries (overlap, raycast)
    /// take a mask and only report objects whose layer intersects it.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CollisionLayer: u32 {
        /// Default layer for most objects
        const DEFAULT = 1 << 0;
        /// Player character layer
        const PLAYER = 1 << 1;
        /// Standable world geometry
        const GROUND = 1 << 2;
        /// Bodies that can be grabbed and pushed
        const PUSHABLE = 1 << 3;
        /// Generic trigger zones (detect but don't push)
        const TRIGGER = 1 << 4;
        /// Trigger zones that forbid grabbing while overlapped
        const PUSH_EXCLUSION = 1 << 5;
        /// All layers
        const ALL = 0xFFFFFFFF;
    }
}

/// Collision filter determining what an object collides with
///
/// Two objects A and B collide if:
/// - (A.layer & B.mask) != 0, AND
/// - (B.layer & A.mask) != 0
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionFilter {
    /// Which layer(s) this object belongs to
    pub layer: CollisionLayer,
    /// Which layer(s) this object can collide with
    pub mask: CollisionLayer,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: CollisionLayer::DEFAULT,
            mask: CollisionLayer::ALL,
        }
    }
}

impl CollisionFilter {
    /// Create a new collision filter with specified layer and mask
    pub fn new(layer: CollisionLayer, mask: CollisionLayer) -> Self {
        Self { layer, mask }
    }

    /// Check if this filter allows collision with another filter
    pub fn collides_with(&self, other: &Self) -> bool {
        self.layer.intersects(other.mask) && other.layer.intersects(self.mask)
    }

    /// Player characters collide with everything except other players and triggers
    pub fn player() -> Self {
        Self {
            layer: CollisionLayer::PLAYER,
            mask: CollisionLayer::ALL
                & !CollisionLayer::PLAYER
                & !CollisionLayer::TRIGGER
                & !CollisionLayer::PUSH_EXCLUSION,
        }
    }

    /// Standable world geometry
    pub fn ground() -> Self {
        Self {
            layer: CollisionLayer::GROUND,
            mask: CollisionLayer::ALL,
        }
    }

    /// Grabbable, pushable props
    pub fn pushable() -> Self {
        Self {
            layer: CollisionLayer::PUSHABLE,
            mask: CollisionLayer::ALL & !CollisionLayer::TRIGGER & !CollisionLayer::PUSH_EXCLUSION,
        }
    }
}

/// Contact information from a collision
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    /// Point of contact
    pub point: Vec3,
    /// Normal pointing from the second shape toward the first
    pub normal: Vec3,
    /// Penetration depth (positive means overlapping)
    pub penetration: f32,
}

impl Contact {
    pub fn new(point: Vec3, normal: Vec3, penetration: f32) -> Self {
        Self {
            point,
            normal,
            penetration,
        }
    }

    /// Check if this represents an actual collision (positive penetration)
    pub fn is_colliding(&self) -> bool {
        self.penetration > 0.0
    }
}

/// Result of a ray query against a single primitive
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    /// Distance along the ray
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// Surface normal at the hit point
    pub normal: Vec3,
}

/// Test sphere vs plane collision
///
/// The contact normal is the plane normal.
pub fn sphere_vs_plane(sphere: &Sphere, plane: &Plane) -> Option<Contact> {
    let penetration = sphere.radius - plane.signed_distance(sphere.center);
    if penetration > 0.0 {
        let normal = plane.normal;
        let point = sphere.center - normal * sphere.radius;
        Some(Contact::new(point, normal, penetration))
    } else {
        None
    }
}

/// Test AABB vs plane collision
pub fn aabb_vs_plane(aabb: &Aabb, plane: &Plane) -> Option<Contact> {
    let center = aabb.center();
    let half_extents = aabb.half_extents();

    // Vertex furthest along -normal
    let closest_vertex = center - half_extents.component_mul(plane.normal.sign());
    let signed_dist = plane.signed_distance(closest_vertex);

    if signed_dist < 0.0 {
        Some(Contact::new(closest_vertex, plane.normal, -signed_dist))
    } else {
        None
    }
}

/// Test sphere vs AABB collision
///
/// The contact normal points from the AABB toward the sphere.
pub fn sphere_vs_aabb(sphere: &Sphere, aabb: &Aabb) -> Option<Contact> {
    let closest = aabb.closest_point(sphere.center);
    let delta = sphere.center - closest;
    let dist_squared = delta.length_squared();

    if dist_squared >= sphere.radius * sphere.radius {
        return None;
    }

    let dist = dist_squared.sqrt();
    let penetration = sphere.radius - dist;

    let normal = if dist > 0.0001 {
        delta.normalized()
    } else {
        // Center inside the box: escape along the shallowest face
        let to_min = sphere.center - aabb.min;
        let to_max = aabb.max - sphere.center;
        let candidates = [
            (to_min.x, -Vec3::X),
            (to_max.x, Vec3::X),
            (to_min.y, -Vec3::Y),
            (to_max.y, Vec3::Y),
            (to_min.z, -Vec3::Z),
            (to_max.z, Vec3::Z),
        ];
        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.0 < best.0 {
                best = *candidate;
            }
        }
        best.1
    };

    Some(Contact::new(closest, normal, penetration))
}

/// Test AABB vs AABB collision
///
/// The contact normal points from B toward A along the axis of least overlap.
pub fn aabb_vs_aabb(a: &Aabb, b: &Aabb) -> Option<Contact> {
    if a.max.x < b.min.x || a.min.x > b.max.x {
        return None;
    }
    if a.max.y < b.min.y || a.min.y > b.max.y {
        return None;
    }
    if a.max.z < b.min.z || a.min.z > b.max.z {
        return None;
    }

    let overlap_x = (a.max.x.min(b.max.x) - a.min.x.max(b.min.x)).max(0.0);
    let overlap_y = (a.max.y.min(b.max.y) - a.min.y.max(b.min.y)).max(0.0);
    let overlap_z = (a.max.z.min(b.max.z) - a.min.z.max(b.min.z)).max(0.0);

    let ca = a.center();
    let cb = b.center();

    let mut min_overlap = overlap_x;
    let mut normal = if ca.x < cb.x { -Vec3::X } else { Vec3::X };

    if overlap_y < min_overlap {
        min_overlap = overlap_y;
        normal = if ca.y < cb.y { -Vec3::Y } else { Vec3::Y };
    }
    if overlap_z < min_overlap {
        min_overlap = overlap_z;
        normal = if ca.z < cb.z { -Vec3::Z } else { Vec3::Z };
    }

    let point = a.closest_point(cb);
    Some(Contact::new(point, normal, min_overlap))
}

/// Test sphere vs sphere collision
///
/// The contact normal points from A toward B.
pub fn sphere_vs_sphere(a: &Sphere, b: &Sphere) -> Option<Contact> {
    let delta = b.center - a.center;
    let dist_sq = delta.length_squared();
    let min_dist = a.radius + b.radius;

    if dist_sq < min_dist * min_dist && dist_sq > 0.0001 {
        let dist = dist_sq.sqrt();
        let normal = delta.normalized();
        let point = a.center + normal * a.radius;
        Some(Contact::new(point, normal, min_dist - dist))
    } else {
        None
    }
}

/// Check whether a query sphere overlaps any collider shape
pub fn sphere_overlaps(sphere: &Sphere, collider: &Collider) -> bool {
    match collider {
        Collider::Sphere(other) => {
            let r = sphere.radius + other.radius;
            (other.center - sphere.center).length_squared() <= r * r
        }
        Collider::Aabb(aabb) => {
            let closest = aabb.closest_point(sphere.center);
            (sphere.center - closest).length_squared() <= sphere.radius * sphere.radius
        }
        Collider::Plane(plane) => plane.signed_distance(sphere.center) <= sphere.radius,
    }
}

/// Cast a ray against a sphere
///
/// Rays starting inside the sphere report no hit.
pub fn ray_vs_sphere(ray: &Ray, sphere: &Sphere, max_distance: f32) -> Option<RayHit> {
    let oc = ray.origin - sphere.center;
    let c = oc.length_squared() - sphere.radius * sphere.radius;
    if c <= 0.0 {
        return None;
    }
    let b = oc.dot(ray.direction);
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    if t < 0.0 || t > max_distance {
        return None;
    }
    let point = ray.at(t);
    Some(RayHit {
        distance: t,
        point,
        normal: (point - sphere.center).normalized(),
    })
}

/// Cast a ray against an AABB (slab method)
///
/// Rays starting inside the box report no hit.
pub fn ray_vs_aabb(ray: &Ray, aabb: &Aabb, max_distance: f32) -> Option<RayHit> {
    let origin = [ray.origin.x, ray.origin.y, ray.origin.z];
    let dir = [ray.direction.x, ray.direction.y, ray.direction.z];
    let min = [aabb.min.x, aabb.min.y, aabb.min.z];
    let max = [aabb.max.x, aabb.max.y, aabb.max.z];
    let axes = [Vec3::X, Vec3::Y, Vec3::Z];

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec3::ZERO;

    for i in 0..3 {
        if dir[i].abs() < 1e-8 {
            if origin[i] < min[i] || origin[i] > max[i] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir[i];
        let mut t0 = (min[i] - origin[i]) * inv;
        let mut t1 = (max[i] - origin[i]) * inv;
        let mut face = -axes[i];
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
            face = axes[i];
        }
        if t0 > t_enter {
            t_enter = t0;
            normal = face;
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_enter < 0.0 || t_enter > max_distance {
        return None;
    }
    Some(RayHit {
        distance: t_enter,
        point: ray.at(t_enter),
        normal,
    })
}

/// Cast a ray against the front face of a plane
pub fn ray_vs_plane(ray: &Ray, plane: &Plane, max_distance: f32) -> Option<RayHit> {
    let denom = plane.normal.dot(ray.direction);
    if denom > -1e-6 {
        // Parallel or approaching from behind
        return None;
    }
    let t = (plane.distance - plane.normal.dot(ray.origin)) / denom;
    if t < 0.0 || t > max_distance {
        return None;
    }
    Some(RayHit {
        distance: t,
        point: ray.at(t),
        normal: plane.normal,
    })
}

/// Cast a ray against any collider shape
pub fn ray_vs_collider(ray: &Ray, collider: &Collider, max_distance: f32) -> Option<RayHit> {
    match collider {
        Collider::Sphere(s) => ray_vs_sphere(ray, s, max_distance),
        Collider::Aabb(b) => ray_vs_aabb(ray, b, max_distance),
        Collider::Plane(p) => ray_vs_plane(ray, p, max_distance),
    }
}

//! Physics for the Pushball platformer
//!
//! This crate provides just enough rigid body simulation for the gameplay
//! layer to stand on:
//! - Collision shapes (spheres, AABBs, planes) and ray queries
//! - Layer-masked overlap and raycast queries
//! - Rigid bodies with per-axis constraints and impulses
//! - Sensors reporting contact enter/exit events
//! - Trigger volumes for zone queries

pub mod body;
pub mod collision;
pub mod material;
pub mod shapes;
pub mod world;

// Re-export commonly used types
pub use body::{BodyKey, Constraints, RigidBody, StaticCollider, TriggerVolume};
pub use collision::{CollisionFilter, CollisionLayer, Contact, RayHit};
pub use material::PhysicsMaterial;
pub use shapes::{Aabb, Collider, Plane, Ray, Sphere};
pub use world::{
    ContactPhase, HitTarget, PhysicsConfig, PhysicsWorld, Sensor, SensorEvent, SensorKey, WorldHit,
};

//! Glint math - double precision vector, ray and bounding volume types.
//!
//! Vectors, quaternions and matrices come straight from glam's `f64`
//! family; this crate adds the ray tracing specific pieces on top.

// Re-export the glam double precision types for convenience
pub use glam::{DMat3, DMat4, DQuat, DVec2, DVec3, DVec4};

mod aabb;
mod interval;
mod ray;
mod transform;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::{rigid_transform, transform_normal, TransformExt};
pub use vector::{near_zero, reflect, refract};

/// A position in world or local space.
pub type Point3 = DVec3;

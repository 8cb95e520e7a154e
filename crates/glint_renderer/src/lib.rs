//! Glint renderer - CPU path tracing
//!
//! A recursive Monte Carlo path tracer: spheres, rectangles, boxes,
//! instances and participating media behind a randomized BVH, shaded by
//! diffuse, metal, glass, emissive and isotropic materials.

mod bvh;
mod camera;
mod constant_medium;
mod cuboid;
mod hittable;
mod instance;
mod material;
mod perlin;
mod rect;
mod renderer;
mod scene;
mod sphere;
mod texture;

pub mod parallel;
pub mod presets;
pub mod sampling;

pub use bvh::Bvh;
pub use camera::{Camera, CameraSettings};
pub use constant_medium::ConstantMedium;
pub use cuboid::Cuboid;
pub use hittable::{HitRecord, Hittable, HittableList, Primitive};
pub use instance::Instance;
pub use material::{Color, Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, Scatter};
pub use parallel::{render_scanlines, RenderControl, RenderOutcome, ScanlineBuffer};
pub use perlin::Perlin;
pub use presets::Preset;
pub use rect::Rect;
pub use renderer::{color_to_rgb8, linear_to_gamma, ray_color, render_pixel, RenderConfig, T_MIN};
pub use scene::{Background, Scene, SceneError};
pub use sphere::Sphere;
pub use texture::{Checker, ImageTexture, NoiseTexture, Texture};

/// Re-export the math types used throughout the public API
pub use glint_math::{Aabb, Interval, Point3, Ray};

//! Core path tracing integrator.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a fixed bounce cap
//! - Emission from diffuse lights, no light sampling
//! - Anti-aliasing via multi-sampling

use glint_math::{Interval, Ray};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::sampling::gen_f64;
use crate::{Camera, Color, Scene};

/// Smallest accepted hit distance; avoids re-hitting the surface a ray left.
pub const T_MIN: f64 = 0.001;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Number of scanline workers
    pub workers: usize,
    /// Start half the workers at the bottom of the image
    pub interlace: bool,
    /// Base seed; worker `i` uses `seed + i`
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            interlace: true,
            seed: 0,
        }
    }
}

/// Compute the color seen by a ray.
///
/// Traces the ray through the scene, bouncing off surfaces and
/// accumulating emitted light weighted by the attenuation along the path.
pub fn ray_color(ray: &Ray, scene: &Scene, depth: u32, rng: &mut dyn RngCore) -> Color {
    // If we've exceeded max depth, no more light is gathered
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = scene.hit(ray, Interval::new(T_MIN, f64::INFINITY), rng) else {
        return scene.background().color(ray);
    };

    let emitted = rec.material.emitted(rec.u, rec.v, rec.p);

    match rec.material.scatter(ray, &rec, rng) {
        Some(scatter) => {
            emitted + scatter.attenuation * ray_color(&scatter.scattered, scene, depth - 1, rng)
        }
        None => emitted,
    }
}

/// Render a single pixel with multi-sampling.
///
/// Pixel `(0, 0)` is the top-left corner of the image. Returns the linear
/// average of the samples; gamma encoding is up to the caller.
pub fn render_pixel(
    scene: &Scene,
    camera: &Camera,
    x: u32,
    y: u32,
    samples_per_pixel: u32,
    max_bounces: u32,
    rng: &mut dyn RngCore,
) -> Color {
    if samples_per_pixel == 0 {
        return Color::ZERO;
    }

    let width = camera.width().max(1) as f64;
    let height = camera.height().max(1) as f64;
    let row = camera.height().saturating_sub(1).saturating_sub(y) as f64;

    let mut pixel_color = Color::ZERO;
    for _ in 0..samples_per_pixel {
        let s = (x as f64 + gen_f64(rng)) / width;
        let t = (row + gen_f64(rng)) / height;
        let ray = camera.get_ray(s, t, rng);
        pixel_color += ray_color(&ray, scene, max_bounces, rng);
    }

    pixel_color / samples_per_pixel as f64
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-encoded 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let intensity = Interval::new(0.0, 0.999);
    let encode = |c: f64| (256.0 * intensity.clamp(linear_to_gamma(c))) as u8;
    [encode(color.x), encode(color.y), encode(color.z)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraSettings, Background, DiffuseLight, Lambertian, Sphere};
    use glint_math::DVec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    const BACKGROUND: Color = Color::new(0.2, 0.3, 0.4);

    fn red_sphere_scene(width: u32, height: u32) -> Scene {
        let camera = Camera::new(CameraSettings::default(), width, height);
        let mut scene = Scene::new(camera);
        scene.add(Sphere::new(
            DVec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::new(Color::new(1.0, 0.0, 0.0)).into()),
        ));
        scene.set_background(Background::Solid(BACKGROUND));
        scene.build_bvh(&mut StdRng::seed_from_u64(1)).unwrap();
        scene
    }

    #[test]
    fn test_depth_zero_is_black() {
        let scene = red_sphere_scene(10, 10);
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new_simple(DVec3::ZERO, DVec3::Y);

        assert_eq!(ray_color(&ray, &scene, 0, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_miss_returns_background() {
        let scene = red_sphere_scene(10, 10);
        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new_simple(DVec3::ZERO, DVec3::Y);

        assert_eq!(ray_color(&ray, &scene, 5, &mut rng), BACKGROUND);
    }

    #[test]
    fn test_end_to_end_center_and_corner() {
        let scene = red_sphere_scene(21, 21);
        let mut rng = StdRng::seed_from_u64(42);

        let center = render_pixel(&scene, scene.camera(), 10, 10, 1, 1, &mut rng);
        assert_ne!(center, BACKGROUND);

        let corner = render_pixel(&scene, scene.camera(), 0, 0, 1, 1, &mut rng);
        assert_eq!(corner, BACKGROUND);
    }

    #[test]
    fn test_diffuse_bounce_picks_up_red() {
        let mut scene = red_sphere_scene(21, 21);
        scene.set_background(Background::Solid(Color::ONE));
        let mut rng = StdRng::seed_from_u64(42);

        let color = render_pixel(&scene, scene.camera(), 10, 10, 16, 8, &mut rng);
        assert!(color.x > 0.0);
        assert_eq!(color.y, 0.0);
        assert_eq!(color.z, 0.0);
    }

    #[test]
    fn test_light_is_seen_directly() {
        let camera = Camera::new(CameraSettings::default(), 9, 9);
        let mut scene = Scene::new(camera);
        scene.add(Sphere::new(
            DVec3::new(0.0, 0.0, -3.0),
            1.0,
            Arc::new(DiffuseLight::new(Color::splat(4.0)).into()),
        ));
        let mut rng = StdRng::seed_from_u64(42);

        let color = render_pixel(&scene, scene.camera(), 4, 4, 4, 3, &mut rng);
        assert_eq!(color, Color::splat(4.0));
    }

    #[test]
    fn test_zero_samples_is_black() {
        let scene = red_sphere_scene(4, 4);
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(render_pixel(&scene, scene.camera(), 0, 0, 0, 5, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(color_to_rgb8(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb8(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::splat(100.0)), [255, 255, 255]);
        assert_eq!(color_to_rgb8(Color::new(0.25, -1.0, f64::NAN)), [128, 0, 0]);
    }

    #[test]
    fn test_config_json_defaults() {
        let config: RenderConfig = serde_json::from_str(r#"{ "samples_per_pixel": 8 }"#).unwrap();
        assert_eq!(config.samples_per_pixel, 8);
        assert_eq!(config.max_depth, RenderConfig::default().max_depth);
        assert!(config.interlace);

        let text = serde_json::to_string(&config).unwrap();
        let back: RenderConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}

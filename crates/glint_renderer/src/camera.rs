//! Thin-lens camera for ray generation.

use glint_math::{DVec3, Point3, Ray};
use rand::RngCore;

use crate::sampling::{gen_range, random_in_unit_disk};

/// User-facing camera parameters. Everything else is derived from these
/// plus the image size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    pub look_from: Point3,
    pub look_at: Point3,
    pub vup: DVec3,
    /// Vertical field of view in degrees
    pub vfov: f64,
    /// Lens diameter; 0 gives a pinhole camera
    pub aperture: f64,
    /// Distance from the lens to the plane of perfect focus
    pub focus_dist: f64,
    /// Shutter open time
    pub time0: f64,
    /// Shutter close time
    pub time1: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Point3::ZERO,
            look_at: Point3::new(0.0, 0.0, -1.0),
            vup: DVec3::Y,
            vfov: 90.0,
            aperture: 0.0,
            focus_dist: 1.0,
            time0: 0.0,
            time1: 0.0,
        }
    }
}

impl CameraSettings {
    /// Camera at `look_from` looking at `look_at`, focused on `look_at`.
    pub fn new(look_from: Point3, look_at: Point3) -> Self {
        Self {
            look_from,
            look_at,
            focus_dist: (look_from - look_at).length(),
            ..Self::default()
        }
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, vup: DVec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Set the shutter interval used for motion blur.
    pub fn with_shutter(mut self, time0: f64, time1: f64) -> Self {
        self.time0 = time0;
        self.time1 = time1;
        self
    }
}

/// Camera for generating rays into the scene.
///
/// Derived state is rebuilt wholesale from the settings whenever the image
/// size changes.
#[derive(Debug, Clone)]
pub struct Camera {
    settings: CameraSettings,
    width: u32,
    height: u32,

    // Cached values derived from the settings
    origin: Point3,
    lower_left_corner: Point3,
    horizontal: DVec3,
    vertical: DVec3,
    u: DVec3,
    v: DVec3,
    lens_radius: f64,
}

impl Camera {
    pub fn new(settings: CameraSettings, width: u32, height: u32) -> Self {
        let aspect_ratio = width.max(1) as f64 / height.max(1) as f64;

        // Calculate viewport dimensions
        let theta = settings.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = aspect_ratio * viewport_height;

        // Calculate camera basis vectors
        let w = (settings.look_from - settings.look_at).normalize();
        let u = settings.vup.cross(w).normalize();
        let v = w.cross(u);

        let origin = settings.look_from;
        let horizontal = settings.focus_dist * viewport_width * u;
        let vertical = settings.focus_dist * viewport_height * v;
        let lower_left_corner = origin - horizontal / 2.0 - vertical / 2.0 - settings.focus_dist * w;

        Self {
            settings,
            width,
            height,
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            lens_radius: settings.aperture / 2.0,
        }
    }

    /// Rebuild the camera for a new image size, keeping its settings.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(self.settings, width, height);
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Ray through viewport coordinates `(s, t)`, with `(0, 0)` at the lower
    /// left and `(1, 1)` at the upper right.
    ///
    /// The origin is jittered across the lens disk and the time drawn
    /// uniformly from the shutter interval.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let rd = self.lens_radius * random_in_unit_disk(rng);
        let offset = self.u * rd.x + self.v * rd.y;
        let time = gen_range(rng, self.settings.time0, self.settings.time1);

        Ray::new(
            self.origin + offset,
            self.lower_left_corner + s * self.horizontal + t * self.vertical - self.origin - offset,
            time,
        )
    }
}

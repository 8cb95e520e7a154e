//! Scene assembly: primitives, acceleration structure, camera and background.

use std::sync::Arc;

use glint_math::{Interval, Ray};
use rand::RngCore;
use thiserror::Error;

use crate::hittable::{HitRecord, Hittable, HittableList, Primitive};
use crate::{Bvh, Camera, Color};

/// Errors raised while assembling or rendering a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Cannot build a BVH over an empty primitive list")]
    EmptyScene,

    #[error("Output buffer is {actual_width}x{actual_height}, camera expects {width}x{height}")]
    BufferSize {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Unknown scene preset: {0}")]
    UnknownPreset(String),
}

/// Color returned for rays that escape the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    Solid(Color),
    /// Vertical white-to-sky-blue gradient
    Sky,
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid(Color::ZERO)
    }
}

impl Background {
    pub fn color(&self, ray: &Ray) -> Color {
        match self {
            Background::Solid(color) => *color,
            Background::Sky => {
                let unit_direction = ray.direction().normalize();
                let a = 0.5 * (unit_direction.y + 1.0);
                (1.0 - a) * Color::ONE + a * Color::new(0.5, 0.7, 1.0)
            }
        }
    }
}

/// Everything a render pass needs, immutable while workers are running.
#[derive(Debug)]
pub struct Scene {
    objects: HittableList,
    root: Option<Bvh>,
    camera: Camera,
    background: Background,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            objects: HittableList::new(),
            root: None,
            camera,
            background: Background::default(),
        }
    }

    /// Add a primitive and return its shared handle.
    ///
    /// Invalidates any built BVH; call `build_bvh` again before rendering.
    pub fn add(&mut self, object: impl Into<Primitive>) -> Arc<Primitive> {
        self.root = None;
        self.objects.push(object)
    }

    /// Build (or rebuild) the BVH over every added primitive, bounding moving
    /// geometry over the camera's shutter interval.
    pub fn build_bvh(&mut self, rng: &mut dyn RngCore) -> Result<(), SceneError> {
        let settings = self.camera.settings();
        let bvh = Bvh::new(
            self.objects.objects().to_vec(),
            settings.time0,
            settings.time1,
            rng,
        )?;
        log::info!(
            "Scene ready: {} primitives, BVH depth {}",
            bvh.len(),
            bvh.depth()
        );
        self.root = Some(bvh);
        Ok(())
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    pub fn background(&self) -> Background {
        self.background
    }

    /// Replace the camera.
    ///
    /// The BVH bounds moving geometry over the shutter, so a camera with a
    /// different shutter invalidates it.
    pub fn set_camera(&mut self, camera: Camera) {
        let (old, new) = (self.camera.settings(), camera.settings());
        if old.time0 != new.time0 || old.time1 != new.time1 {
            self.root = None;
        }
        self.camera = camera;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Recreate the camera for a new image size. Geometry is untouched.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    pub fn objects(&self) -> &HittableList {
        &self.objects
    }

    pub fn bvh(&self) -> Option<&Bvh> {
        self.root.as_ref()
    }

    /// Closest hit through the BVH, or a linear scan if none is built yet.
    pub fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        match &self.root {
            Some(bvh) => bvh.hit(ray, ray_t, rng),
            None => self.objects.hit(ray, ray_t, rng),
        }
    }
}

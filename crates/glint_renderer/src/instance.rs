//! Affine instancing of shared geometry.

use std::sync::Arc;

use glint_math::{transform_normal, Aabb, DMat4, DQuat, DVec3, Interval, Ray, TransformExt};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, Primitive};

/// Places a shared primitive in the world through a 4x4 affine transform.
///
/// The source is never copied or mutated, so one mesh of spheres can be
/// instanced many times.
#[derive(Debug, Clone)]
pub struct Instance {
    source: Arc<Primitive>,
    transform: DMat4,
    inverse: DMat4,
    normal_matrix: DMat4,
    bbox: Aabb,
}

impl Instance {
    /// Wrap `source` with a local-to-world `transform`.
    ///
    /// The world bounding box is derived from the source's box over the unit
    /// shutter interval and cached.
    pub fn new(source: Arc<Primitive>, transform: DMat4) -> Self {
        let bbox = transform.transform_aabb(&source.bounding_box(0.0, 1.0));
        Self {
            source,
            transform,
            inverse: transform.inverse(),
            normal_matrix: transform.normal_matrix(),
            bbox,
        }
    }

    pub fn translate(source: Arc<Primitive>, offset: DVec3) -> Self {
        Self::new(source, DMat4::from_translation(offset))
    }

    /// Rotate about the world Y axis by `degrees`.
    pub fn rotate_y(source: Arc<Primitive>, degrees: f64) -> Self {
        Self::new(source, DMat4::from_quat(DQuat::from_rotation_y(degrees.to_radians())))
    }

    pub fn transform(&self) -> &DMat4 {
        &self.transform
    }

    pub fn source(&self) -> &Arc<Primitive> {
        &self.source
    }
}

impl Hittable for Instance {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        // Unnormalized direction keeps t identical in both spaces
        let local = self.inverse.transform_ray(ray);

        self.source.hit(&local, ray_t, rng).map(|mut rec| {
            rec.p = self.transform.transform_point3(rec.p);
            rec.normal = transform_normal(&self.normal_matrix, rec.normal);
            rec
        })
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Aabb {
        self.bbox
    }
}

//! Oriented rectangle primitive.

use std::sync::Arc;

use glint_math::{rigid_transform, Aabb, DMat4, DQuat, DVec3, Interval, Point3, Ray, TransformExt};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;

/// Local directions with a smaller z component are treated as parallel to the plane.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Minimum bounding box thickness, so flat rectangles still have volume.
const BBOX_PADDING: f64 = 1e-4;

/// A `width` x `height` rectangle centered at `center`.
///
/// In local space it lies in the z=0 plane with normal +Z; `rotation` then
/// `center` place it in the world.
#[derive(Debug, Clone)]
pub struct Rect {
    width: f64,
    height: f64,
    transform: DMat4,
    inverse: DMat4,
    bbox: Aabb,
    material: Arc<Material>,
}

impl Rect {
    pub fn new(
        width: f64,
        height: f64,
        center: Point3,
        rotation: DQuat,
        material: Arc<Material>,
    ) -> Self {
        let transform = rigid_transform(center, rotation);
        let (hw, hh) = (width / 2.0, height / 2.0);
        let corners = [
            DVec3::new(-hw, -hh, 0.0),
            DVec3::new(hw, -hh, 0.0),
            DVec3::new(hw, hh, 0.0),
            DVec3::new(-hw, hh, 0.0),
        ];
        let bbox = Aabb::from_points(corners.map(|c| transform.transform_point3(c)))
            .pad_to_minimums(BBOX_PADDING);

        Self {
            width,
            height,
            transform,
            inverse: transform.inverse(),
            bbox,
            material,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Unit normal of the front face in world space.
    pub fn normal(&self) -> DVec3 {
        self.transform.transform_vector3(DVec3::Z).normalize()
    }
}

impl Hittable for Rect {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local = self.inverse.transform_ray(ray);
        let (o, d) = (local.origin(), local.direction());
        if d.z.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = -o.z / d.z;
        if !ray_t.surrounds(t) {
            return None;
        }

        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        let x = o.x + t * d.x;
        let y = o.y + t * d.y;
        if x < -hw || x > hw || y < -hh || y > hh {
            return None;
        }

        let uv = ((x + hw) / self.width, (y + hh) / self.height);
        let p = self.transform.transform_point3(DVec3::new(x, y, 0.0));
        Some(HitRecord::new(ray, t, p, self.normal(), uv, &self.material))
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Aabb {
        self.bbox
    }
}
